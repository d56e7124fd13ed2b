//! Network configuration: which node to talk to and which accounts may sign.
//!
//! The built-in `sepolia` network takes its endpoint from `SEPOLIA_URL` and
//! its only account from `PRIVATE_KEY`. Additional networks can be declared
//! in a TOML file:
//!
//! ```toml
//! [networks.local]
//! url = "http://127.0.0.1:8545"
//! accounts = ["${LOCAL_PRIVATE_KEY}"]
//! chain-id = 31337
//! ```
//!
//! Values of the form `${NAME}` are replaced by the environment variable
//! `NAME` when the network is resolved.

use {
    alloy::signers::local::PrivateKeySigner,
    ethrpc::signer::{InvalidPrivateKey, parse_private_key},
    serde::Deserialize,
    std::{collections::BTreeMap, fmt, path::Path},
    url::Url,
};

pub const DEFAULT_NETWORK: &str = "sepolia";
pub const URL_ENV: &str = "SEPOLIA_URL";
pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read network config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse network config {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("unknown network {0:?}")]
    UnknownNetwork(String),
    #[error("network {network:?} has no endpoint url configured")]
    MissingUrl { network: String },
    #[error("network {network:?} has an invalid endpoint url: {source}")]
    InvalidUrl {
        network: String,
        source: url::ParseError,
    },
    #[error("network {network:?} has no accounts configured")]
    NoAccounts { network: String },
    #[error("account #{index} of network {network:?} is invalid: {source}")]
    InvalidAccount {
        network: String,
        index: usize,
        source: InvalidPrivateKey,
    },
    #[error("environment variable {variable} referenced by network {network:?} is not set")]
    MissingVariable { network: String, variable: String },
}

/// Unresolved description of a network, as found in the environment or in a
/// config file.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct NetworkEntry {
    pub url: Option<String>,
    #[serde(default)]
    pub accounts: Vec<String>,
    pub chain_id: Option<u64>,
}

impl fmt::Debug for NetworkEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkEntry")
            .field("url", &self.url.as_ref().map(|_| "SECRET"))
            .field("accounts", &self.accounts.len())
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct NetworkConfig {
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkEntry>,
}

impl NetworkConfig {
    /// The built-in configuration: a single `sepolia` network backed by the
    /// process environment.
    pub fn builtin(env: &impl Fn(&str) -> Option<String>) -> Self {
        let sepolia = NetworkEntry {
            url: env(URL_ENV).filter(|url| !url.trim().is_empty()),
            accounts: env(PRIVATE_KEY_ENV)
                .filter(|key| !key.trim().is_empty())
                .into_iter()
                .collect(),
            chain_id: Some(11155111),
        };
        Self {
            networks: BTreeMap::from([(DEFAULT_NETWORK.to_string(), sepolia)]),
        }
    }

    pub fn from_toml(content: &str, path: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Loads the built-in networks and, if given, the networks declared in
    /// `path`. Networks from the file replace built-in ones of the same name.
    pub fn load(
        path: Option<&Path>,
        env: &impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::builtin(env);
        if let Some(path) = path {
            let path_display = path.display().to_string();
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path_display.clone(),
                source,
            })?;
            let file = Self::from_toml(&content, &path_display)?;
            tracing::debug!(path = %path_display, networks = ?file.networks.keys(), "loaded network config");
            config.networks.extend(file.networks);
        }
        Ok(config)
    }

    /// Resolves the network called `name` into something that can be used to
    /// sign and submit transactions. Fails if the network is unknown, has no
    /// valid endpoint or no valid account.
    pub fn resolve(
        &self,
        name: &str,
        env: &impl Fn(&str) -> Option<String>,
    ) -> Result<Network, ConfigError> {
        let entry = self
            .networks
            .get(name)
            .ok_or_else(|| ConfigError::UnknownNetwork(name.to_string()))?;

        let url = entry
            .url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingUrl {
                network: name.to_string(),
            })?;
        let url = interpolate(url, name, env)?;
        let url = Url::parse(url.trim()).map_err(|source| ConfigError::InvalidUrl {
            network: name.to_string(),
            source,
        })?;

        let accounts = entry
            .accounts
            .iter()
            .enumerate()
            .map(|(index, key)| {
                let key = interpolate(key, name, env)?;
                parse_private_key(&key).map_err(|source| ConfigError::InvalidAccount {
                    network: name.to_string(),
                    index,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if accounts.is_empty() {
            return Err(ConfigError::NoAccounts {
                network: name.to_string(),
            });
        }

        Ok(Network {
            name: name.to_string(),
            url,
            accounts,
            chain_id: entry.chain_id,
        })
    }
}

/// Replaces a value that is entirely of the form `${NAME}` with the
/// environment variable `NAME`.
fn interpolate(
    value: &str,
    network: &str,
    env: &impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    match value
        .trim()
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
    {
        Some(variable) => env(variable).ok_or_else(|| ConfigError::MissingVariable {
            network: network.to_string(),
            variable: variable.to_string(),
        }),
        None => Ok(value.to_string()),
    }
}

/// A fully resolved network. Always has at least one account.
pub struct Network {
    pub name: String,
    pub url: Url,
    accounts: Vec<PrivateKeySigner>,
    pub chain_id: Option<u64>,
}

impl Network {
    /// The account used to sign deployments: the first one configured.
    pub fn default_signer(&self) -> &PrivateKeySigner {
        &self.accounts[0]
    }
}

impl fmt::Debug for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Network")
            .field("name", &self.name)
            .field("url", &"SECRET")
            .field(
                "accounts",
                &self.accounts.iter().map(|a| a.address()).collect::<Vec<_>>(),
            )
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use {super::*, alloy::primitives::address, std::collections::HashMap};

    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn fake_env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn resolves_builtin_sepolia_from_environment() {
        let env = fake_env(&[
            (URL_ENV, "https://sepolia.example.org/v3/key"),
            (PRIVATE_KEY_ENV, DEV_KEY),
        ]);
        let network = NetworkConfig::builtin(&env)
            .resolve(DEFAULT_NETWORK, &env)
            .unwrap();

        assert_eq!(network.name, "sepolia");
        assert_eq!(network.url.as_str(), "https://sepolia.example.org/v3/key");
        assert_eq!(network.chain_id, Some(11155111));
        assert_eq!(network.accounts.len(), 1);
        assert_eq!(
            network.default_signer().address(),
            address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
    }

    #[test]
    fn missing_url_fails() {
        let env = fake_env(&[(PRIVATE_KEY_ENV, DEV_KEY)]);
        let err = NetworkConfig::builtin(&env)
            .resolve(DEFAULT_NETWORK, &env)
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingUrl { .. }));
    }

    #[test]
    fn missing_or_blank_private_key_fails() {
        for vars in [
            vec![(URL_ENV, "http://localhost:8545")],
            vec![(URL_ENV, "http://localhost:8545"), (PRIVATE_KEY_ENV, "  ")],
        ] {
            let env = fake_env(&vars);
            let err = NetworkConfig::builtin(&env)
                .resolve(DEFAULT_NETWORK, &env)
                .unwrap_err();
            assert!(matches!(err, ConfigError::NoAccounts { .. }));
        }
    }

    #[test]
    fn invalid_credentials_fail() {
        let env = fake_env(&[(URL_ENV, "not a url"), (PRIVATE_KEY_ENV, DEV_KEY)]);
        let err = NetworkConfig::builtin(&env)
            .resolve(DEFAULT_NETWORK, &env)
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));

        let env = fake_env(&[(URL_ENV, "http://localhost:8545"), (PRIVATE_KEY_ENV, "0x1234")]);
        let err = NetworkConfig::builtin(&env)
            .resolve(DEFAULT_NETWORK, &env)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidAccount {
                index: 0,
                source: InvalidPrivateKey::Malformed,
                ..
            }
        ));
        assert!(!err.to_string().contains("0x1234"));
    }

    #[test]
    fn unknown_network_fails() {
        let env = fake_env(&[]);
        let err = NetworkConfig::builtin(&env)
            .resolve("mainnet", &env)
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownNetwork(name) if name == "mainnet"));
    }

    #[test]
    fn file_networks_interpolate_environment() {
        let config = NetworkConfig::from_toml(
            r#"
            [networks.local]
            url = "http://127.0.0.1:8545"
            accounts = ["${LOCAL_KEY}", "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d"]
            chain-id = 31337
            "#,
            "networks.toml",
        )
        .unwrap();

        let network = config
            .resolve("local", &fake_env(&[("LOCAL_KEY", DEV_KEY)]))
            .unwrap();
        assert_eq!(network.chain_id, Some(31337));
        assert_eq!(network.accounts.len(), 2);
        assert_eq!(
            network.default_signer().address(),
            address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );

        let err = config.resolve("local", &fake_env(&[])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingVariable { variable, .. } if variable == "LOCAL_KEY"
        ));
    }

    #[test]
    fn file_networks_override_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("networks.toml");
        std::fs::write(
            &path,
            r#"
            [networks.sepolia]
            url = "https://rpc.sepolia.org"
            accounts = ["${DEPLOYER_KEY}"]
            "#,
        )
        .unwrap();

        let env = fake_env(&[
            (URL_ENV, "http://ignored:8545"),
            ("DEPLOYER_KEY", DEV_KEY),
        ]);
        let network = NetworkConfig::load(Some(&path), &env)
            .unwrap()
            .resolve("sepolia", &env)
            .unwrap();
        assert_eq!(network.url.as_str(), "https://rpc.sepolia.org/");
        assert_eq!(network.chain_id, None);
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = NetworkConfig::from_toml(
            r#"
            [networks.local]
            url = "http://127.0.0.1:8545"
            gas-price = 1
            "#,
            "networks.toml",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let env = fake_env(&[
            (URL_ENV, "https://sepolia.example.org/v3/api-key"),
            (PRIVATE_KEY_ENV, DEV_KEY),
        ]);
        let config = NetworkConfig::builtin(&env);
        let network = config.resolve(DEFAULT_NETWORK, &env).unwrap();
        for output in [format!("{config:?}"), format!("{network:?}")] {
            assert!(!output.contains("api-key"));
            assert!(!output.contains(&DEV_KEY[2..]));
        }
    }
}
