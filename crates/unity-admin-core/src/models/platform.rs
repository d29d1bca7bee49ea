use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Platform {
    /// Description for list display, or a dash when absent.
    pub fn description_display(&self) -> &str {
        self.description
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or("-")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Partial update; absent fields are left unchanged by the server.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlatformUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionBank {
    pub id: i64,
    pub name: String,
    pub platform_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionBankCreate {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Procedure {
    pub id: i64,
    pub name: String,
    pub question_bank_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcedureCreate {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcedureUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_without_description() {
        let platform: Platform = serde_json::from_str(r#"{"id": 1, "name": "Welding"}"#).unwrap();
        assert_eq!(platform.description, None);
        assert_eq!(platform.description_display(), "-");
    }

    #[test]
    fn test_platform_update_omits_unset_fields() {
        let update = PlatformUpdate {
            name: Some("Lathe".to_string()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"name":"Lathe"}"#);
    }
}
