use kube::config::{KubeConfigOptions, Kubeconfig, KubeconfigError};
use kube::{Client, Config};
use std::path::Path;

/// Possible errors from building kubernetes client.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// Failed to infer client configuration from the environment.
    #[error("failed to infer kube configuration")]
    InferConfigError(#[from] kube::config::InferConfigError),

    /// Failed to process kube configuration.
    #[error("failed to process kube configuration")]
    KubeconfigError(#[from] KubeconfigError),

    /// Failed to build kubernetes client.
    #[error("failed to build kubernetes client")]
    KubeError(#[from] kube::Error),
}

/// Wrapper for the kubernetes [`Client`].
pub struct KubernetesClient {
    client: Client,
}

impl KubernetesClient {
    /// Creates new [`KubernetesClient`] instance.\
    /// **Note** that without `kube_config` and `kube_context` the configuration is inferred,
    /// so the in-cluster service account is used when running inside a pod.
    pub async fn new(kube_config: Option<&Path>, kube_context: Option<&str>) -> Result<Self, ClientError> {
        let options = KubeConfigOptions {
            context: kube_context.map(String::from),
            user: None,
            cluster: None,
        };

        let config = match kube_config {
            Some(path) => Config::from_custom_kubeconfig(Kubeconfig::read_from(path)?, &options).await?,
            None if kube_context.is_some() => Config::from_kubeconfig(&options).await?,
            None => Config::infer().await?,
        };

        Ok(Self {
            client: Client::try_from(config)?,
        })
    }

    /// Returns cloned kubernetes client that can be consumed.
    pub fn get_client(&self) -> Client {
        self.client.clone()
    }

    /// Returns kubernetes API server version.
    pub async fn k8s_version(&self) -> Result<String, ClientError> {
        Ok(self.client.apiserver_version().await?.git_version)
    }
}
