use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use serde_json::{Value, json};

use crate::http::{Transport, TransportError};

use super::watch_history::Sleeper;

const FETCH_OPERATION: &str = "GetWatchHistoryHub";
const DELETE_OPERATION: &str = "removeActivity";

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub(crate) operation: String,
    pub(crate) variables: Value,
}

#[derive(Debug, Clone)]
enum Event {
    Call(RecordedCall),
    Sleep(Duration),
}

// requests and sleeps land in one log so their relative order can be asserted
type EventLog = Rc<RefCell<Vec<Event>>>;

#[derive(Debug, Default)]
pub(crate) struct FakeTransport {
    responses: RefCell<VecDeque<Result<Value, TransportError>>>,
    events: EventLog,
}

impl FakeTransport {
    pub(crate) fn new(responses: Vec<Result<Value, TransportError>>) -> Self {
        Self {
            responses: RefCell::new(VecDeque::from(responses)),
            events: EventLog::default(),
        }
    }

    pub(crate) fn sleeper(&self) -> RecordingSleeper {
        RecordingSleeper {
            events: Rc::clone(&self.events),
        }
    }

    pub(crate) fn calls(&self) -> Vec<RecordedCall> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Call(call) => Some(call.clone()),
                Event::Sleep(_) => None,
            })
            .collect()
    }

    pub(crate) fn operations(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.operation).collect()
    }

    // operation names and `sleep {duration:?}` entries in the order they happened
    pub(crate) fn timeline(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .map(|event| match event {
                Event::Call(call) => call.operation.clone(),
                Event::Sleep(duration) => format!("sleep {duration:?}"),
            })
            .collect()
    }

    pub(crate) fn fetch_cursors(&self) -> Vec<Option<String>> {
        self.calls()
            .iter()
            .filter(|call| call.operation == FETCH_OPERATION)
            .map(|call| {
                call.variables
                    .get("after")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .collect()
    }

    pub(crate) fn delete_ids(&self) -> Vec<String> {
        self.calls()
            .iter()
            .filter(|call| call.operation == DELETE_OPERATION)
            .filter_map(|call| call.variables.pointer("/input/id")?.as_str().map(str::to_string))
            .collect()
    }
}

impl Transport for FakeTransport {
    fn execute(
        &self,
        _query: &str,
        variables: Value,
        operation_name: &str,
    ) -> Result<Value, TransportError> {
        self.events.borrow_mut().push(Event::Call(RecordedCall {
            operation: operation_name.to_string(),
            variables,
        }));
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted response left for {operation_name}"))
    }
}

#[derive(Debug)]
pub(crate) struct RecordingSleeper {
    events: EventLog,
}

impl RecordingSleeper {
    pub(crate) fn sleeps(&self) -> Vec<Duration> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Sleep(duration) => Some(*duration),
                Event::Call(_) => None,
            })
            .collect()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.events.borrow_mut().push(Event::Sleep(duration));
    }
}

pub(crate) fn node(id: &str, item_type: &str, title: &str) -> Value {
    json!({ "id": id, "metadataItem": { "type": item_type, "title": title } })
}

pub(crate) fn episode_node(id: &str, title: &str, show: &str, season: &str) -> Value {
    json!({
        "id": id,
        "metadataItem": {
            "type": "episode",
            "title": title,
            "parent": { "title": season },
            "grandparent": { "title": show }
        }
    })
}

pub(crate) fn history_page(nodes: Vec<Value>, next_cursor: Option<&str>) -> Value {
    json!({
        "data": { "user": { "watchHistory": {
            "nodes": nodes,
            "pageInfo": { "hasNextPage": next_cursor.is_some(), "endCursor": next_cursor }
        }}}
    })
}

pub(crate) fn deleted() -> Value {
    json!({ "data": { "removeActivity": true } })
}

pub(crate) fn rate_limited(retry_after: Option<Value>) -> Value {
    let mut extensions = json!({ "code": "RATE_LIMITED" });
    if let Some(value) = retry_after {
        extensions["retryAfter"] = value;
    }
    json!({ "errors": [{ "message": "Too many requests", "extensions": extensions }] })
}
