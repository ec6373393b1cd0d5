use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value;

use tether_proto::RemoteError;

pub type MethodFuture = BoxFuture<'static, Result<Value, RemoteError>>;

pub type MethodFn<T> = Box<dyn Fn(Arc<T>, Vec<Value>) -> MethodFuture + Send + Sync>;

/// The statically declared method schema of a dispatch target: each entry
/// maps a callable name to an async body taking the target and the call's
/// ordered arguments. Doubles as the resolve-by-name capability the
/// dispatcher uses and as the name list proxy construction consumes.
pub struct MethodTable<T> {
    methods: HashMap<String, MethodFn<T>>,
}

impl<T> MethodTable<T> {
    pub fn new() -> Self {
        MethodTable {
            methods: HashMap::new(),
        }
    }

    /// Declares `name` as callable. Re-registering a name replaces the
    /// earlier entry.
    pub fn register<F, Fut>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(Arc<T>, Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, RemoteError>> + Send + 'static,
    {
        self.methods.insert(
            name.into(),
            Box::new(move |target, arguments| Box::pin(body(target, arguments))),
        );
        self
    }

    pub fn resolve(&self, name: &str) -> Option<&MethodFn<T>> {
        self.methods.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl<T> Default for MethodTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Decodes the positional argument at `index`, reporting `InvalidArgument`
/// on absence or type mismatch.
pub fn arg<A: DeserializeOwned>(arguments: &[Value], index: usize) -> Result<A, RemoteError> {
    let value = arguments
        .get(index)
        .ok_or_else(|| RemoteError::invalid_argument(format!("missing argument {index}")))?;
    serde_json::from_value(value.clone())
        .map_err(|err| RemoteError::invalid_argument(format!("argument {index}: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Nothing;

    #[test]
    fn resolves_registered_names_only() {
        let table = MethodTable::new()
            .register("ping", |_t: Arc<Nothing>, _args| async { Ok(json!("pong")) });
        assert!(table.resolve("ping").is_some());
        assert!(table.resolve("pong").is_none());
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["ping"]);
    }

    #[test]
    fn arg_reports_missing_and_mismatched() {
        let args = vec![json!(1), json!("two")];
        assert_eq!(arg::<i64>(&args, 0).unwrap(), 1);
        assert_eq!(arg::<String>(&args, 1).unwrap(), "two");
        assert!(arg::<i64>(&args, 1).is_err());
        assert!(arg::<i64>(&args, 2).is_err());
    }
}
