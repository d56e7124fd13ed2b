//! Lookup of compiled contracts in a Hardhat style artifacts directory.
//!
//! Hardhat writes one JSON file per contract to
//! `artifacts/contracts/<Source>.sol/<Contract>.json`. Debug files
//! (`*.dbg.json`) and the `build-info` directory are not artifacts.

use {
    alloy::json_abi::JsonAbi,
    serde::Deserialize,
    std::path::{Path, PathBuf},
    walkdir::WalkDir,
};

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("no artifact for contract {name:?} found in {root}")]
    NotFound { name: String, root: PathBuf },
    #[error("contract name {name:?} is ambiguous, candidates: {candidates:?}")]
    Ambiguous {
        name: String,
        candidates: Vec<PathBuf>,
    },
    #[error("failed to read artifact {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed artifact {path}: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("artifact {path} contains contract {found:?}, expected {expected:?}")]
    Mismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub contract_name: String,
    #[serde(default)]
    pub source_name: Option<String>,
    pub abi: JsonAbi,
    /// Hex encoded creation code. Kept as a string since unlinked libraries
    /// leave placeholders in it that aren't valid hex.
    pub bytecode: String,
}

#[derive(Debug, Clone)]
pub struct Artifacts {
    root: PathBuf,
}

impl Artifacts {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Loads the artifact of the contract called `name`.
    pub fn load(&self, name: &str) -> Result<Artifact, ArtifactError> {
        let direct = self
            .root
            .join("contracts")
            .join(format!("{name}.sol"))
            .join(format!("{name}.json"));
        if direct.is_file() {
            tracing::debug!(path = %direct.display(), "loading artifact");
            let artifact = read(&direct)?;
            if artifact.contract_name != name {
                return Err(ArtifactError::Mismatch {
                    path: direct,
                    expected: name.to_string(),
                    found: artifact.contract_name,
                });
            }
            return Ok(artifact);
        }

        let mut found = self.search(name)?;
        match found.len() {
            0 => Err(ArtifactError::NotFound {
                name: name.to_string(),
                root: self.root.clone(),
            }),
            1 => {
                let (path, artifact) = found.remove(0);
                tracing::debug!(path = %path.display(), "loading artifact");
                Ok(artifact)
            }
            _ => Err(ArtifactError::Ambiguous {
                name: name.to_string(),
                candidates: found.into_iter().map(|(path, _)| path).collect(),
            }),
        }
    }

    fn search(&self, name: &str) -> Result<Vec<(PathBuf, Artifact)>, ArtifactError> {
        let file_name = format!("{name}.json");
        let mut found = Vec::new();
        let entries = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.file_name() != "build-info")
            // Unreadable directories simply don't contain the artifact.
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file() && entry.file_name() == file_name.as_str());
        for entry in entries {
            let artifact = read(entry.path())?;
            if artifact.contract_name == name {
                found.push((entry.into_path(), artifact));
            }
        }
        Ok(found)
    }
}

fn read(path: &Path) -> Result<Artifact, ArtifactError> {
    let content = std::fs::read(path).map_err(|source| ArtifactError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&content).map_err(|source| ArtifactError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use {super::*, serde_json::json};

    pub const TOKEN_BYTECODE: &str = "0x6080604052348015600f57600080fd5b50";
    pub const GAME_BYTECODE: &str = "0x608060405234801561001057600080fd5b50";

    pub fn token_artifact() -> serde_json::Value {
        json!({
            "_format": "hh-sol-artifact-1",
            "contractName": "Token",
            "sourceName": "contracts/Token.sol",
            "abi": [
                {"inputs": [], "stateMutability": "nonpayable", "type": "constructor"},
                {
                    "inputs": [
                        {"internalType": "address", "name": "to", "type": "address"},
                        {"internalType": "uint256", "name": "amount", "type": "uint256"}
                    ],
                    "name": "mint",
                    "outputs": [],
                    "stateMutability": "nonpayable",
                    "type": "function"
                }
            ],
            "bytecode": TOKEN_BYTECODE,
            "deployedBytecode": "0x",
            "linkReferences": {},
            "deployedLinkReferences": {}
        })
    }

    pub fn game_artifact() -> serde_json::Value {
        json!({
            "_format": "hh-sol-artifact-1",
            "contractName": "Game",
            "sourceName": "contracts/Game.sol",
            "abi": [
                {
                    "inputs": [{"internalType": "address", "name": "_token", "type": "address"}],
                    "stateMutability": "nonpayable",
                    "type": "constructor"
                },
                {
                    "inputs": [{"internalType": "uint8", "name": "guess", "type": "uint8"}],
                    "name": "play",
                    "outputs": [],
                    "stateMutability": "nonpayable",
                    "type": "function"
                }
            ],
            "bytecode": GAME_BYTECODE,
            "deployedBytecode": "0x",
            "linkReferences": {},
            "deployedLinkReferences": {}
        })
    }

    pub fn write(root: &Path, relative: &str, artifact: &serde_json::Value) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, serde_json::to_vec_pretty(artifact).unwrap()).unwrap();
    }

    /// An artifacts directory as Hardhat leaves it after compiling both
    /// contracts.
    pub fn hardhat_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "contracts/Token.sol/Token.json", &token_artifact());
        write(dir.path(), "contracts/Game.sol/Game.json", &game_artifact());
        write(
            dir.path(),
            "contracts/Game.sol/Game.dbg.json",
            &json!({"_format": "hh-sol-dbg-1", "buildInfo": "../../build-info/abc.json"}),
        );
        write(dir.path(), "build-info/abc.json", &json!({"id": "abc"}));
        dir
    }

    #[test]
    fn loads_artifact_from_hardhat_layout() {
        let dir = hardhat_tree();
        let artifacts = Artifacts::new(dir.path());

        let token = artifacts.load("Token").unwrap();
        assert_eq!(token.contract_name, "Token");
        assert_eq!(token.source_name.as_deref(), Some("contracts/Token.sol"));
        assert_eq!(token.bytecode, TOKEN_BYTECODE);
        assert!(token.abi.constructor.is_some());
        assert!(token.abi.function("mint").is_some());

        let game = artifacts.load("Game").unwrap();
        assert_eq!(game.abi.constructor.unwrap().inputs.len(), 1);
    }

    #[test]
    fn falls_back_to_searching_by_contract_name() {
        let dir = tempfile::tempdir().unwrap();
        // Contract declared in a file named differently than the contract.
        write(dir.path(), "contracts/Tokens.sol/Token.json", &token_artifact());

        let token = Artifacts::new(dir.path()).load("Token").unwrap();
        assert_eq!(token.contract_name, "Token");
    }

    #[test]
    fn missing_artifact_is_not_found() {
        let dir = hardhat_tree();
        let err = Artifacts::new(dir.path()).load("Lottery").unwrap_err();
        assert!(matches!(err, ArtifactError::NotFound { name, .. } if name == "Lottery"));

        let err = Artifacts::new(dir.path().join("missing"))
            .load("Token")
            .unwrap_err();
        assert!(matches!(err, ArtifactError::NotFound { .. }));
    }

    #[test]
    fn duplicate_contract_names_are_ambiguous() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "contracts/a/Token.sol/Token.json", &token_artifact());
        write(dir.path(), "contracts/b/Token.sol/Token.json", &token_artifact());

        let err = Artifacts::new(dir.path()).load("Token").unwrap_err();
        match err {
            ArtifactError::Ambiguous { candidates, .. } => assert_eq!(candidates.len(), 2),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn wrong_contract_in_expected_location_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "contracts/Token.sol/Token.json", &game_artifact());

        let err = Artifacts::new(dir.path()).load("Token").unwrap_err();
        assert!(matches!(err, ArtifactError::Mismatch { found, .. } if found == "Game"));
    }

    #[test]
    fn malformed_artifact_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "contracts/Token.sol/Token.json",
            &json!({"contractName": "Token"}),
        );

        let err = Artifacts::new(dir.path()).load("Token").unwrap_err();
        assert!(matches!(err, ArtifactError::Malformed { .. }));
    }
}
