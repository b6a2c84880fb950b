use async_trait::async_trait;
use c4bridge_client::Error;
use c4bridge_client::VariableClient;
use c4bridge_client::VariableSnapshot;

/// Trait for reading and writing proxy variables
///
/// This trait allows for mocking the driver for testing purposes
#[async_trait]
pub trait Variables: Send + Sync {
    /// Read every variable in `variable_ids`
    async fn get(&self, variable_ids: &[String]) -> Result<VariableSnapshot, Error>;

    /// Write one variable
    async fn set(&self, variable_id: &str, value: &str) -> Result<(), Error>;
}

#[async_trait]
impl Variables for VariableClient {
    async fn get(&self, variable_ids: &[String]) -> Result<VariableSnapshot, Error> {
        VariableClient::get(self, variable_ids).await
    }

    async fn set(&self, variable_id: &str, value: &str) -> Result<(), Error> {
        VariableClient::set(self, variable_id, value).await
    }
}

#[cfg(test)]
pub use mock::MockVariables;

#[cfg(test)]
mod mock {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Default)]
    struct MockState {
        values: HashMap<String, String>,
        sets: Vec<(String, String)>,
        gets: usize,
        fail_status: Option<u16>,
    }

    /// In-memory driver for testing
    ///
    /// Clones share the same variables, so a test can keep a handle after
    /// moving one into an entity.
    #[derive(Debug, Clone, Default)]
    pub struct MockVariables {
        state: Arc<Mutex<MockState>>,
    }

    impl MockVariables {
        pub fn with_values(values: &[(&str, &str)]) -> Self {
            let mock = Self::default();
            for (id, value) in values {
                mock.set_value(id, value);
            }
            mock
        }

        pub fn set_value(&self, variable_id: &str, value: &str) {
            self.state
                .lock()
                .unwrap()
                .values
                .insert(variable_id.to_string(), value.to_string());
        }

        /// Make every following call fail with `status`
        pub fn fail_with(&self, status: u16) {
            self.state.lock().unwrap().fail_status = Some(status);
        }

        pub fn recover(&self) {
            self.state.lock().unwrap().fail_status = None;
        }

        /// Every successful write, in order
        pub fn sets(&self) -> Vec<(String, String)> {
            self.state.lock().unwrap().sets.clone()
        }

        /// Number of reads attempted
        pub fn gets(&self) -> usize {
            self.state.lock().unwrap().gets
        }
    }

    #[async_trait]
    impl Variables for MockVariables {
        async fn get(&self, variable_ids: &[String]) -> Result<VariableSnapshot, Error> {
            let mut state = self.state.lock().unwrap();
            state.gets += 1;
            if let Some(status) = state.fail_status {
                return Err(Error::RemoteRejected { status });
            }

            variable_ids
                .iter()
                .map(|id| match state.values.get(id) {
                    Some(value) => Ok((id.clone(), value.clone())),
                    None => Err(Error::MalformedResponse {
                        message: format!("variable {id} missing from response"),
                        body: String::new(),
                    }),
                })
                .collect()
        }

        async fn set(&self, variable_id: &str, value: &str) -> Result<(), Error> {
            let mut state = self.state.lock().unwrap();
            if let Some(status) = state.fail_status {
                return Err(Error::RemoteRejected { status });
            }

            state
                .sets
                .push((variable_id.to_string(), value.to_string()));
            state
                .values
                .insert(variable_id.to_string(), value.to_string());
            Ok(())
        }
    }
}
