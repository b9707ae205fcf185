use std::time::Duration;

use serde_json::{Value, json};

use super::{HistoryEntry, HistoryError, Page};

pub(crate) const WATCH_HISTORY_OPERATION: &str = "GetWatchHistoryHub";
pub(crate) const WATCH_HISTORY_QUERY: &str = r#"
query GetWatchHistoryHub($uuid: ID = "", $first: PaginationInt!, $after: String) {
  user(id: $uuid) {
    watchHistory(first: $first, after: $after) {
      nodes {
        id
        metadataItem {
          type
          title
          parent {
            title
          }
          grandparent {
            title
          }
        }
      }
      pageInfo {
        hasNextPage
        endCursor
      }
    }
  }
}
"#;

pub(crate) const REMOVE_ACTIVITY_OPERATION: &str = "removeActivity";
pub(crate) const REMOVE_ACTIVITY_MUTATION: &str = r#"
mutation removeActivity($input: RemoveActivityInput!) {
  removeActivity(input: $input)
}
"#;

pub(crate) const RATE_LIMITED_CODE: &str = "RATE_LIMITED";
const UNKNOWN: &str = "Unknown";

pub(crate) fn watch_history_variables(user_id: &str, first: u32, after: Option<&str>) -> Value {
    let mut variables = json!({ "uuid": user_id, "first": first });
    if let Some(cursor) = after {
        variables["after"] = Value::String(cursor.to_string());
    }
    variables
}

pub(crate) fn remove_activity_variables(activity_id: &str) -> Value {
    json!({ "input": { "id": activity_id, "type": "WATCH_HISTORY" } })
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RetryDirective {
    Proceed(Value),
    RateLimited(Duration),
    Fatal(String),
}

fn error_list(value: &Value) -> Option<&Vec<Value>> {
    value
        .get("errors")
        .and_then(Value::as_array)
        .filter(|errors| !errors.is_empty())
}

fn error_code(error: &Value) -> Option<&str> {
    error
        .pointer("/extensions/code")
        .or_else(|| error.get("code"))
        .and_then(Value::as_str)
}

fn retry_after(error: &Value) -> Option<Duration> {
    let raw = error.pointer("/extensions/retryAfter")?;
    let secs = match raw {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if secs < 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(secs).ok()
}

pub(crate) fn inspect_mutation_response(
    response: Value,
    default_retry_after: Duration,
) -> RetryDirective {
    let Some(errors) = error_list(&response) else {
        return RetryDirective::Proceed(response);
    };

    if let Some(limited) = errors
        .iter()
        .find(|error| error_code(error) == Some(RATE_LIMITED_CODE))
    {
        return RetryDirective::RateLimited(retry_after(limited).unwrap_or(default_retry_after));
    }

    RetryDirective::Fatal(Value::Array(errors.clone()).to_string())
}

fn optional_title(metadata: &Value, relation: &str) -> Option<String> {
    metadata
        .get(relation)?
        .get("title")?
        .as_str()
        .map(str::to_string)
}

fn parse_node(index: usize, node: &Value) -> Result<HistoryEntry, HistoryError> {
    let id = node
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| HistoryError::MalformedResponse(format!("node {index} has no id")))?;

    let metadata = node.get("metadataItem").unwrap_or(&Value::Null);
    let text = |key: &str| {
        metadata
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN)
            .to_string()
    };

    Ok(HistoryEntry {
        id: id.to_string(),
        item_type: text("type"),
        title: text("title"),
        parent_title: optional_title(metadata, "parent"),
        grandparent_title: optional_title(metadata, "grandparent"),
    })
}

pub(crate) fn parse_watch_history_page(response: &Value) -> Result<Page, HistoryError> {
    if let Some(errors) = error_list(response) {
        return Err(HistoryError::Api(Value::Array(errors.clone()).to_string()));
    }

    let history = response
        .pointer("/data/user/watchHistory")
        .filter(|value| value.is_object())
        .ok_or_else(|| {
            HistoryError::MalformedResponse("missing data.user.watchHistory".to_string())
        })?;

    let nodes = history
        .get("nodes")
        .and_then(Value::as_array)
        .ok_or_else(|| HistoryError::MalformedResponse("missing nodes array".to_string()))?;
    let entries = nodes
        .iter()
        .enumerate()
        .map(|(index, node)| parse_node(index, node))
        .collect::<Result<Vec<_>, _>>()?;

    let has_next_page = history
        .pointer("/pageInfo/hasNextPage")
        .and_then(Value::as_bool)
        .ok_or_else(|| {
            HistoryError::MalformedResponse("missing pageInfo.hasNextPage".to_string())
        })?;
    let end_cursor = history
        .pointer("/pageInfo/endCursor")
        .and_then(Value::as_str)
        .map(str::to_string);
    if has_next_page && end_cursor.is_none() {
        return Err(HistoryError::MalformedResponse(
            "hasNextPage is true but endCursor is missing".to_string(),
        ));
    }

    Ok(Page {
        entries,
        has_next_page,
        end_cursor,
    })
}
