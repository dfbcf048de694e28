use std::{
    fs,
    path::{Path, PathBuf},
};

use ethers::{
    abi::Abi,
    types::{Address, Bytes},
};
use serde::Deserialize;

use crate::error::{ChainError, Result};

/// Subset of a Hardhat compilation artifact.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HardhatArtifact {
    contract_name: String,
    abi: Abi,
    bytecode: Bytes,
}

/// Callable surface and creation code of a named contract.
#[derive(Debug, Clone)]
pub struct ContractInterface {
    pub name: String,
    pub abi: Abi,
    pub bytecode: Bytes,
}

/// A contract interface bound to an on-chain address.
#[derive(Debug, Clone)]
pub struct ContractInstance {
    pub name: String,
    pub abi: Abi,
    pub address: Address,
}

impl ContractInterface {
    /// Loads `<name>` from a Hardhat artifacts directory.
    pub fn from_artifacts(artifacts: &Path, name: &str) -> Result<Self> {
        let path = artifact_path(artifacts, name)?;
        log::info!("{} artifact:{}", name, path.display());

        let content = fs::read_to_string(&path)
            .map_err(|e| ChainError::ArtifactNotFound(format!("{}: {}", path.display(), e)))?;
        let artifact: HardhatArtifact = serde_json::from_str(&content)
            .map_err(|e| ChainError::ArtifactNotFound(format!("{}: {}", path.display(), e)))?;

        if artifact.contract_name != name {
            return Err(ChainError::ArtifactNotFound(format!(
                "{} describes {}, not {}",
                path.display(),
                artifact.contract_name,
                name
            )));
        }
        if artifact.bytecode.is_empty() {
            return Err(ChainError::ArtifactNotFound(format!(
                "{} has no bytecode (abstract contract or interface)",
                name
            )));
        }

        Ok(Self {
            name: artifact.contract_name,
            abi: artifact.abi,
            bytecode: artifact.bytecode,
        })
    }

    /// Binds the interface to `address` without touching the chain.
    pub fn attach(&self, address: &str) -> Result<ContractInstance> {
        Ok(self.at(parse_address(address)?))
    }

    pub fn at(&self, address: Address) -> ContractInstance {
        ContractInstance {
            name: self.name.clone(),
            abi: self.abi.clone(),
            address,
        }
    }
}

pub fn parse_address(address: &str) -> Result<Address> {
    let hex = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| ChainError::InvalidAddress(address.to_string()))?;
    if hex.len() != 40 {
        return Err(ChainError::InvalidAddress(address.to_string()));
    }
    hex.parse::<Address>()
        .map_err(|_| ChainError::InvalidAddress(address.to_string()))
}

fn artifact_path(artifacts: &Path, name: &str) -> Result<PathBuf> {
    let file_name = format!("{}.json", name);
    let direct = artifacts
        .join("contracts")
        .join(format!("{}.sol", name))
        .join(&file_name);
    if direct.is_file() {
        return Ok(direct);
    }

    find_artifact(artifacts, &file_name)?.ok_or_else(|| {
        ChainError::ArtifactNotFound(format!(
            "{} under {} (has the project been compiled?)",
            name,
            artifacts.display()
        ))
    })
}

fn find_artifact(dir: &Path, file_name: &str) -> Result<Option<PathBuf>> {
    let entries = fs::read_dir(dir)
        .map_err(|e| ChainError::ArtifactNotFound(format!("{}: {}", dir.display(), e)))?;

    let mut subdirs = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| ChainError::ArtifactNotFound(format!("{}: {}", dir.display(), e)))?
            .path();
        if path.is_dir() {
            if path.file_name().map_or(false, |n| n == "build-info") {
                continue;
            }
            subdirs.push(path);
        } else if path.file_name().map_or(false, |n| n == file_name) {
            return Ok(Some(path));
        }
    }

    subdirs.sort();
    for subdir in subdirs {
        if let Some(path) = find_artifact(&subdir, file_name)? {
            return Ok(Some(path));
        }
    }
    Ok(None)
}
