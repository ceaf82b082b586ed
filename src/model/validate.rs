//! Validation hook run before every write.

use async_trait::async_trait;

use crate::error::ValidationError;

/// Checks a candidate document before it is written.
///
/// Any `Fn(&D) -> Result<(), ValidationError>` is a validator. Implement the
/// trait directly when validation needs to await something.
#[async_trait]
pub trait Validate<D>: Send + Sync {
    async fn validate(&self, document: &D) -> Result<(), ValidationError>;
}

/// Default validator; accepts every document.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

#[async_trait]
impl<D: Sync> Validate<D> for AcceptAll {
    async fn validate(&self, _document: &D) -> Result<(), ValidationError> {
        Ok(())
    }
}

#[async_trait]
impl<D, F> Validate<D> for F
where
    D: Sync,
    F: Fn(&D) -> Result<(), ValidationError> + Send + Sync,
{
    async fn validate(&self, document: &D) -> Result<(), ValidationError> {
        (self)(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    struct RequiresName;

    #[async_trait]
    impl Validate<Value> for RequiresName {
        async fn validate(&self, document: &Value) -> Result<(), ValidationError> {
            match document.get("name").and_then(Value::as_str) {
                Some(name) if !name.is_empty() => Ok(()),
                _ => Err(ValidationError::new("invalid document").with_detail("name is required")),
            }
        }
    }

    #[tokio::test]
    async fn accept_all_accepts() {
        let result = Validate::<Value>::validate(&AcceptAll, &json!({})).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn closures_are_validators() {
        let positive = |n: &i64| {
            if *n > 0 {
                Ok(())
            } else {
                Err(ValidationError::new("must be positive"))
            }
        };

        assert!(Validate::<i64>::validate(&positive, &3).await.is_ok());
        let err = Validate::<i64>::validate(&positive, &-1).await.unwrap_err();
        assert_eq!(err.message, "must be positive");
    }

    #[tokio::test]
    async fn trait_objects_carry_details() {
        let validator: Box<dyn Validate<Value>> = Box::new(RequiresName);
        let err = validator.validate(&json!({ "name": "" })).await.unwrap_err();
        assert_eq!(err.details, vec!["name is required".to_string()]);
        assert!(validator.validate(&json!({ "name": "Rex" })).await.is_ok());
    }
}
