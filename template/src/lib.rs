//! Template macro that expands `NSP::GrassFormation::<Kind>` resources into
//! custom resources served by the dispatcher.

use displaydoc::Display;
use grassformation_event::{RESOURCE_KIND_PROPERTY, SERVICE_TOKEN_PROPERTY};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, error};

pub const RESOURCE_TYPE_PREFIX: &str = "NSP::GrassFormation::";
pub const CUSTOM_RESOURCE_TYPE_PREFIX: &str = "Custom::GrassFormation";
pub const CUSTOM_RESOURCE_VERSION: &str = "1.0";

const RESOURCES: &str = "Resources";
const TYPE: &str = "Type";
const VERSION: &str = "Version";
const PROPERTIES: &str = "Properties";

pub type Fragment = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Error, Display)]
pub enum TemplateError {
    /// Template "Resources" is not a mapping
    ResourcesNotAMapping,
    /// Resource "{name}" is not a mapping
    ResourceNotAMapping { name: String },
    /// Resource "{name}" has no string "Type"
    MissingType { name: String },
    /// Resource "{name}" has type "{resource_type}" with no resource kind
    MissingKind { name: String, resource_type: String },
    /// Resource "{name}" has no "Properties" mapping
    MissingProperties { name: String },
}

/// Rewrites every prefixed resource of `fragment`. Other resources, and any
/// attribute of a rewritten resource besides `Type`, `Version` and
/// `Properties`, are left as they are.
#[tracing::instrument(skip_all)]
pub fn transform(mut fragment: Fragment, service_token: &str) -> Result<Fragment, TemplateError> {
    let Some(resources) = fragment.get_mut(RESOURCES) else {
        return Ok(fragment);
    };
    let resources = resources
        .as_object_mut()
        .ok_or(TemplateError::ResourcesNotAMapping)?;

    for (name, resource) in resources.iter_mut() {
        let resource = resource
            .as_object_mut()
            .ok_or_else(|| TemplateError::ResourceNotAMapping { name: name.clone() })?;
        let resource_type = resource
            .get(TYPE)
            .and_then(Value::as_str)
            .ok_or_else(|| TemplateError::MissingType { name: name.clone() })?;
        let Some(kind) = resource_type.strip_prefix(RESOURCE_TYPE_PREFIX) else {
            continue;
        };
        let kind = kind.rsplit("::").next().unwrap_or_default().to_owned();
        if kind.is_empty() {
            return Err(TemplateError::MissingKind {
                name: name.clone(),
                resource_type: resource_type.to_owned(),
            });
        }

        let properties = resource
            .get_mut(PROPERTIES)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| TemplateError::MissingProperties { name: name.clone() })?;
        properties.insert(
            SERVICE_TOKEN_PROPERTY.to_owned(),
            Value::String(service_token.to_owned()),
        );
        properties.insert(RESOURCE_KIND_PROPERTY.to_owned(), Value::String(kind.clone()));

        let custom_type = format!("{CUSTOM_RESOURCE_TYPE_PREFIX}{kind}");
        debug!(%name, %custom_type, "rewriting resource");
        resource.insert(TYPE.to_owned(), Value::String(custom_type));
        resource.insert(
            VERSION.to_owned(),
            Value::String(CUSTOM_RESOURCE_VERSION.to_owned()),
        );
    }

    Ok(fragment)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroEvent {
    pub request_id: String,
    pub fragment: Fragment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MacroStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroResponse {
    pub request_id: String,
    pub status: MacroStatus,
    pub fragment: Fragment,
}

/// Runs the macro. On failure the original fragment is handed back.
pub fn handle_macro(event: MacroEvent, service_token: &str) -> MacroResponse {
    let MacroEvent {
        request_id,
        fragment,
    } = event;
    match transform(fragment.clone(), service_token) {
        Ok(fragment) => MacroResponse {
            request_id,
            status: MacroStatus::Success,
            fragment,
        },
        Err(err) => {
            error!(%request_id, "{err}");
            MacroResponse {
                request_id,
                status: MacroStatus::Failure,
                fragment,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TOKEN: &str = "arn:aws:lambda:eu-west-1:123456789012:function:dispatch";

    fn fragment(value: Value) -> Fragment {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn rewrites_prefixed_resources_only() {
        let input = fragment(json!({
            "Resources": {
                "Functions": {
                    "Type": "NSP::GrassFormation::Function",
                    "DependsOn": "Role",
                    "Properties": { "Name": "functions" },
                },
                "Role": {
                    "Type": "AWS::IAM::Role",
                    "Properties": { "Path": "/" },
                },
            },
        }));
        let output = transform(input, TOKEN).unwrap();
        assert_eq!(
            Value::Object(output),
            json!({
                "Resources": {
                    "Functions": {
                        "Type": "Custom::GrassFormationFunction",
                        "DependsOn": "Role",
                        "Properties": {
                            "Name": "functions",
                            "ServiceToken": TOKEN,
                            "GrassFormationResourceType": "Function",
                        },
                        "Version": "1.0",
                    },
                    "Role": {
                        "Type": "AWS::IAM::Role",
                        "Properties": { "Path": "/" },
                    },
                },
            })
        );
    }

    #[test]
    fn fragment_without_resources_is_unchanged() {
        let input = fragment(json!({ "Outputs": {} }));
        assert_eq!(transform(input.clone(), TOKEN).unwrap(), input);
    }

    #[test]
    fn missing_properties_fails() {
        let input = fragment(json!({
            "Resources": { "Group": { "Type": "NSP::GrassFormation::Group" } },
        }));
        assert_eq!(
            transform(input, TOKEN),
            Err(TemplateError::MissingProperties {
                name: "Group".to_owned()
            })
        );
    }

    #[test]
    fn empty_kind_fails() {
        let input = fragment(json!({
            "Resources": { "X": { "Type": "NSP::GrassFormation::", "Properties": {} } },
        }));
        assert!(matches!(
            transform(input, TOKEN),
            Err(TemplateError::MissingKind { .. })
        ));
    }

    #[test]
    fn macro_failure_returns_original_fragment() {
        let event: MacroEvent = serde_json::from_value(json!({
            "requestId": "req-1",
            "fragment": {
                "Resources": {
                    "Ok": { "Type": "NSP::GrassFormation::Logger", "Properties": {} },
                    "Bad": { "Type": "NSP::GrassFormation::Core", "Properties": "nope" },
                },
            },
        }))
        .unwrap();
        let original = event.fragment.clone();
        let response = handle_macro(event, TOKEN);
        assert_eq!(response.status, MacroStatus::Failure);
        assert_eq!(response.fragment, original);
        assert_eq!(
            serde_json::to_value(&response).unwrap()["status"],
            json!("failure")
        );
    }

    #[test]
    fn macro_success_response_shape() {
        let event = MacroEvent {
            request_id: "req-2".to_owned(),
            fragment: fragment(json!({
                "Resources": { "Cores": { "Type": "NSP::GrassFormation::Core", "Properties": {} } },
            })),
        };
        let response = serde_json::to_value(handle_macro(event, TOKEN)).unwrap();
        assert_eq!(response["requestId"], json!("req-2"));
        assert_eq!(response["status"], json!("success"));
        assert_eq!(
            response["fragment"]["Resources"]["Cores"]["Type"],
            json!("Custom::GrassFormationCore")
        );
    }
}
