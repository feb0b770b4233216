//! Network registry for EVM chains.
//!
//! This module defines the static table of networks the dashboard knows
//! about. It is consulted when switching the wallet to another chain, when
//! registering an unknown chain with the provider, and when building block
//! explorer links.

use serde::Serialize;

use super::DashError;

// ============================================================================
// Constants
// ============================================================================

/// Ethereum Mainnet chain id.
pub const MAINNET_CHAIN_ID: u64 = 1;

/// Sepolia testnet chain id.
pub const SEPOLIA_CHAIN_ID: u64 = 11_155_111;

/// Chain used when nothing else is configured.
pub const DEFAULT_CHAIN_ID: u64 = SEPOLIA_CHAIN_ID;

// ============================================================================
// Network Types
// ============================================================================

/// Native currency metadata, as expected by `wallet_addEthereumChain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NativeCurrency {
    /// Human-readable currency name.
    pub name: &'static str,
    /// Ticker symbol.
    pub symbol: &'static str,
    /// Number of decimals of the smallest unit.
    pub decimals: u8,
}

/// Metadata for one supported chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkInfo {
    /// EIP-155 chain id.
    pub chain_id: u64,
    /// Display name.
    pub name: &'static str,
    /// Public JSON-RPC endpoint.
    pub rpc_url: &'static str,
    /// Block explorer base URL (no trailing slash).
    pub block_explorer_url: &'static str,
    /// Native currency of the chain.
    pub native_currency: NativeCurrency,
}

impl NetworkInfo {
    /// Returns the chain id in the `0x`-prefixed hex form used by wallet RPC.
    #[must_use]
    pub fn chain_id_hex(&self) -> String {
        chain_id_hex(self.chain_id)
    }

    /// Returns the explorer URL for a transaction hash.
    #[must_use]
    pub fn tx_url(&self, hash: &str) -> String {
        format!("{}/tx/{}", self.block_explorer_url, hash)
    }

    /// Builds the `wallet_addEthereumChain` parameter object.
    #[must_use]
    pub fn add_chain_params(&self) -> serde_json::Value {
        serde_json::json!({
            "chainId": self.chain_id_hex(),
            "chainName": self.name,
            "rpcUrls": [self.rpc_url],
            "blockExplorerUrls": [self.block_explorer_url],
            "nativeCurrency": self.native_currency,
        })
    }
}

impl std::fmt::Display for NetworkInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (Chain ID: {})", self.name, self.chain_id)
    }
}

// ============================================================================
// Registry
// ============================================================================

const ETHER: NativeCurrency = NativeCurrency {
    name: "Ether",
    symbol: "ETH",
    decimals: 18,
};

const MATIC: NativeCurrency = NativeCurrency {
    name: "MATIC",
    symbol: "MATIC",
    decimals: 18,
};

static SUPPORTED_NETWORKS: [NetworkInfo; 5] = [
    NetworkInfo {
        chain_id: MAINNET_CHAIN_ID,
        name: "Ethereum Mainnet",
        rpc_url: "https://ethereum.publicnode.com",
        block_explorer_url: "https://etherscan.io",
        native_currency: ETHER,
    },
    NetworkInfo {
        chain_id: SEPOLIA_CHAIN_ID,
        name: "Sepolia Testnet",
        rpc_url: "https://ethereum-sepolia.publicnode.com",
        block_explorer_url: "https://sepolia.etherscan.io",
        native_currency: NativeCurrency {
            name: "Sepolia Ether",
            symbol: "SEP",
            decimals: 18,
        },
    },
    NetworkInfo {
        chain_id: 5,
        name: "Goerli Testnet",
        rpc_url: "https://ethereum-goerli.publicnode.com",
        block_explorer_url: "https://goerli.etherscan.io",
        native_currency: NativeCurrency {
            name: "Goerli Ether",
            symbol: "GOR",
            decimals: 18,
        },
    },
    NetworkInfo {
        chain_id: 137,
        name: "Polygon Mainnet",
        rpc_url: "https://polygon-rpc.com",
        block_explorer_url: "https://polygonscan.com",
        native_currency: MATIC,
    },
    NetworkInfo {
        chain_id: 80_001,
        name: "Polygon Mumbai",
        rpc_url: "https://rpc-mumbai.maticvigil.com",
        block_explorer_url: "https://mumbai.polygonscan.com",
        native_currency: MATIC,
    },
];

/// Looks up a chain in the registry.
#[must_use]
pub fn network_info(chain_id: u64) -> Option<&'static NetworkInfo> {
    SUPPORTED_NETWORKS.iter().find(|n| n.chain_id == chain_id)
}

/// Returns every supported network in registry order.
#[must_use]
pub fn supported_networks() -> &'static [NetworkInfo] {
    &SUPPORTED_NETWORKS
}

/// Formats a chain id as `0x`-prefixed lowercase hex.
#[must_use]
pub fn chain_id_hex(chain_id: u64) -> String {
    format!("{chain_id:#x}")
}

/// Parses a chain id reported by a provider.
///
/// Providers report hex (`"0xaa36a7"`); decimal strings are accepted too.
///
/// # Errors
///
/// Returns `DashError::Parse` if the value is not a valid integer.
pub fn parse_chain_id(raw: &str) -> Result<u64, DashError> {
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => raw.parse::<u64>(),
    };
    parsed.map_err(|_| DashError::parse(format!("invalid chain id '{raw}'")))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_is_sepolia() {
        let info = network_info(DEFAULT_CHAIN_ID).unwrap();
        assert_eq!(info.name, "Sepolia Testnet");
        assert_eq!(info.chain_id_hex(), "0xaa36a7");
    }

    #[test]
    fn test_unknown_chain() {
        assert!(network_info(42).is_none());
        assert!(network_info(MAINNET_CHAIN_ID).is_some());
    }

    #[test]
    fn test_registry_ids_are_unique() {
        let networks = supported_networks();
        for (i, a) in networks.iter().enumerate() {
            assert!(networks[i + 1..].iter().all(|b| b.chain_id != a.chain_id));
        }
    }

    #[rstest]
    #[case::hex("0xaa36a7", 11_155_111)]
    #[case::upper_prefix("0X1", 1)]
    #[case::decimal("137", 137)]
    #[case::padded(" 0x89 ", 137)]
    fn test_parse_chain_id(#[case] raw: &str, #[case] expected: u64) {
        assert_eq!(parse_chain_id(raw).unwrap(), expected);
    }

    #[test]
    fn test_parse_chain_id_rejects_garbage() {
        assert!(parse_chain_id("0xzz").is_err());
        assert!(parse_chain_id("").is_err());
    }

    #[test]
    fn test_add_chain_params() {
        let params = network_info(137).unwrap().add_chain_params();
        assert_eq!(params["chainId"], "0x89");
        assert_eq!(params["chainName"], "Polygon Mainnet");
        assert_eq!(params["rpcUrls"][0], "https://polygon-rpc.com");
        assert_eq!(params["blockExplorerUrls"][0], "https://polygonscan.com");
        assert_eq!(params["nativeCurrency"]["symbol"], "MATIC");
        assert_eq!(params["nativeCurrency"]["decimals"], 18);
    }

    #[test]
    fn test_tx_url_and_display() {
        let info = network_info(SEPOLIA_CHAIN_ID).unwrap();
        assert_eq!(
            info.tx_url("0xabc"),
            "https://sepolia.etherscan.io/tx/0xabc"
        );
        assert_eq!(format!("{info}"), "Sepolia Testnet (Chain ID: 11155111)");
    }
}
