use serde_json::{json, Value};
use std::sync::LazyLock;

pub static CONFIG_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "properties": {
            "http": {
                "type": "object",
                "properties": {
                    "timeout_secs": { "type": "integer", "minimum": 1 },
                    "concurrency": { "type": "integer", "minimum": 1 },
                    "delay_ms": { "type": "integer", "minimum": 0 },
                    "user_agent": { "type": "string" },
                    "accept_invalid_certs": { "type": "boolean" }
                }
            },
            "rules": {
                "type": "object",
                "properties": {
                    "upload": {
                        "type": "object",
                        "properties": {
                            "success": { "$ref": "#/$defs/keywords" },
                            "failure": { "$ref": "#/$defs/keywords" },
                            "error_token": { "type": "string" },
                            "accepted_statuses": {
                                "type": "array",
                                "items": { "type": "integer", "minimum": 100, "maximum": 599 }
                            }
                        }
                    },
                    "execution": {
                        "type": "object",
                        "properties": {
                            "by_extension": {
                                "type": "array",
                                "items": { "$ref": "#/$defs/indicator_set" }
                            },
                            "html_fallback": { "$ref": "#/$defs/keywords" }
                        }
                    }
                }
            },
            "paths": {
                "type": "object",
                "properties": {
                    "upload_dirs": { "type": "array", "items": { "type": "string" } },
                    "field_name": { "type": "string", "minLength": 1 }
                }
            },
            "discovery": {
                "type": "object",
                "properties": {
                    "max_depth": { "type": "integer", "minimum": 1 }
                }
            }
        },
        "$defs": {
            "keywords": { "type": "array", "items": { "type": "string" } },
            "indicator_set": {
                "type": "object",
                "required": ["extensions", "indicators"],
                "properties": {
                    "extensions": { "type": "array", "items": { "type": "string", "pattern": "^\\." } },
                    "indicators": { "$ref": "#/$defs/keywords" }
                }
            }
        }
    })
});
