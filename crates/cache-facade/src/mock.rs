//! In-memory stand-in for a Redis connection, used by unit tests.

use redis::aio::ConnectionLike;
use redis::{Arg, Cmd, ErrorKind, Pipeline, RedisError, RedisFuture, RedisResult, Value};
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

#[derive(Default)]
struct MockState {
    entries: HashMap<String, Entry>,
    offline: bool,
    hang_ping: bool,
    commands: Vec<Vec<String>>,
}

/// Interprets the handful of commands the crate issues
#[derive(Clone, Default)]
pub struct MockConnection {
    state: Arc<Mutex<MockState>>,
}

impl MockConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every command fails like a reset socket
    pub fn set_offline(&self, offline: bool) {
        self.state().offline = offline;
    }

    /// Make `PING` never complete
    pub fn hang_ping(&self) {
        self.state().hang_ping = true;
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.state().entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: None,
            },
        );
    }

    /// Every command received so far, as argument strings
    pub fn commands(&self) -> Vec<Vec<String>> {
        self.state().commands.clone()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    fn execute(&self, args: &[String]) -> RedisResult<Value> {
        let mut state = self.state();
        state.commands.push(args.to_vec());

        if state.offline {
            return Err(io::Error::new(io::ErrorKind::ConnectionReset, "mock connection reset").into());
        }

        let now = Instant::now();
        state
            .entries
            .retain(|_, entry| entry.expires_at.is_none_or(|at| at > now));

        let reply = match (args[0].to_ascii_uppercase().as_str(), &args[1..]) {
            ("PING", []) => Value::SimpleString("PONG".to_string()),
            ("SET", [key, value, rest @ ..]) => {
                let expires_at = match rest {
                    [ex, secs] if ex.eq_ignore_ascii_case("EX") => {
                        Some(now + Duration::from_secs(parse_int(secs)?.unsigned_abs()))
                    }
                    [px, millis] if px.eq_ignore_ascii_case("PX") => {
                        Some(now + Duration::from_millis(parse_int(millis)?.unsigned_abs()))
                    }
                    [] => None,
                    _ => return Err(syntax_error()),
                };
                state.entries.insert(
                    key.clone(),
                    Entry {
                        value: value.clone(),
                        expires_at,
                    },
                );
                Value::Okay
            }
            (name @ ("EXPIRE" | "PEXPIRE"), [key, amount]) => {
                let amount = parse_int(amount)?;
                let ttl = if name == "EXPIRE" {
                    Duration::from_secs(amount.unsigned_abs())
                } else {
                    Duration::from_millis(amount.unsigned_abs())
                };
                if !state.entries.contains_key(key) {
                    Value::Int(0)
                } else if amount <= 0 {
                    state.entries.remove(key);
                    Value::Int(1)
                } else if let Some(entry) = state.entries.get_mut(key) {
                    entry.expires_at = Some(now + ttl);
                    Value::Int(1)
                } else {
                    Value::Int(0)
                }
            }
            ("GET", [key]) => state
                .entries
                .get(key)
                .map_or(Value::Nil, |entry| bulk(&entry.value)),
            ("MGET", keys) if !keys.is_empty() => Value::Array(
                keys.iter()
                    .map(|key| {
                        state
                            .entries
                            .get(key)
                            .map_or(Value::Nil, |entry| bulk(&entry.value))
                    })
                    .collect(),
            ),
            ("EXISTS", keys) if !keys.is_empty() => {
                Value::Int(keys.iter().filter(|key| state.entries.contains_key(*key)).count() as i64)
            }
            ("DEL", keys) if !keys.is_empty() => Value::Int(
                keys.iter()
                    .filter(|key| state.entries.remove(*key).is_some())
                    .count() as i64,
            ),
            ("FLUSHDB", []) => {
                state.entries.clear();
                Value::Okay
            }
            ("KEYS", [pattern]) if pattern == "*" => {
                Value::Array(state.entries.keys().map(|key| bulk(key)).collect::<Vec<_>>())
            }
            ("DBSIZE", []) => Value::Int(state.entries.len() as i64),
            _ => {
                return Err(RedisError::from((
                    ErrorKind::ResponseError,
                    "unknown command",
                    args.join(" "),
                )));
            }
        };

        Ok(reply)
    }
}

fn bulk(value: &str) -> Value {
    Value::BulkString(value.as_bytes().to_vec())
}

fn parse_int(raw: &str) -> RedisResult<i64> {
    raw.parse()
        .map_err(|_| RedisError::from((ErrorKind::ResponseError, "value is not an integer")))
}

fn syntax_error() -> RedisError {
    RedisError::from((ErrorKind::ResponseError, "syntax error"))
}

impl ConnectionLike for MockConnection {
    fn req_packed_command<'a>(&'a mut self, cmd: &'a Cmd) -> RedisFuture<'a, Value> {
        let args: Vec<String> = cmd
            .args_iter()
            .filter_map(|arg| match arg {
                Arg::Simple(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
                Arg::Cursor => None,
            })
            .collect();
        let hang = self.state().hang_ping && args.first().is_some_and(|name| name == "PING");
        let this = self.clone();

        Box::pin(async move {
            if hang {
                std::future::pending::<()>().await;
            }
            this.execute(&args)
        })
    }

    fn req_packed_commands<'a>(
        &'a mut self,
        _cmd: &'a Pipeline,
        _offset: usize,
        _count: usize,
    ) -> RedisFuture<'a, Vec<Value>> {
        Box::pin(async {
            Err(RedisError::from((
                ErrorKind::ClientError,
                "pipelines are not supported by the mock",
            )))
        })
    }

    fn get_db(&self) -> i64 {
        0
    }
}
