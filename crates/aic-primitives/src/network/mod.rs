//! Network parameter tables for the aicoin ledger.
//!
//! Version bytes used by WIF keys, P2PKH/P2SH addresses and extended keys,
//! plus the message magic, genesis header and default peer port of each
//! network. Values are fixed at compile time; callers select a table by
//! reference or by name.

use serde::Serialize;

use crate::PrimitivesError;

/// Genesis block header fields of a network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Genesis {
    /// Block hash as displayed (hex, not reversed).
    pub hash: &'static str,
    pub merkle_root: &'static str,
    pub height: u32,
    pub nonce: u32,
    pub version: u32,
    pub timestamp: u32,
    /// Compact difficulty target.
    pub bits: u32,
}

/// Parameters of one aicoin network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Network {
    pub name: &'static str,
    /// Message-start bytes prefixed to every peer message.
    pub magic: [u8; 4],
    /// Version byte of P2PKH addresses.
    pub address_version: u8,
    /// Version byte of WIF-encoded private keys.
    pub priv_key_version: u8,
    /// Version byte of P2SH addresses.
    pub p2sh_version: u8,
    pub hkey_public_version: u32,
    pub hkey_private_version: u32,
    pub genesis: Genesis,
    pub default_port: u16,
}

/// The production network. Addresses begin with `A`.
pub const LIVENET: Network = Network {
    name: "livenet",
    magic: [0xbe, 0xf9, 0xb4, 0xd9],
    address_version: 23,
    priv_key_version: 128,
    p2sh_version: 5,
    hkey_public_version: 0x0488_b21e,
    hkey_private_version: 0x0488_ade4,
    genesis: Genesis {
        hash: "c726f94ea32887573f95352ae58259e32596a5ea5c475f0e2fcdc7b9a948506c",
        merkle_root: "0123da0013e976472467a8184ac91cd303c69dc8cd98072df4bf8df71dadd2ee",
        height: 0,
        nonce: 2_083_236_893,
        version: 1,
        timestamp: 1_417_543_722,
        bits: 0x1d00_ffff,
    },
    default_port: 31416,
};

/// The public test network.
pub const TESTNET: Network = Network {
    name: "testnet",
    magic: [0x11, 0x0b, 0x09, 0x07],
    address_version: 0x6f,
    priv_key_version: 239,
    p2sh_version: 196,
    hkey_public_version: 0x0435_87cf,
    hkey_private_version: 0x0435_8394,
    genesis: Genesis {
        hash: "43497fd7f826957108f4a30fd9cec3aeba79972084e90ead01ea330900000000",
        merkle_root: "3ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a",
        height: 0,
        nonce: 414_098_458,
        version: 1,
        timestamp: 1_296_688_602,
        bits: 486_604_799,
    },
    default_port: 27184,
};

impl Network {
    /// Look up a network by name. `mainnet` is an alias of `livenet`.
    pub fn from_name(name: &str) -> Result<&'static Network, PrimitivesError> {
        match name {
            "livenet" | "mainnet" => Ok(&LIVENET),
            "testnet" => Ok(&TESTNET),
            other => Err(PrimitivesError::UnknownNetwork(other.to_string())),
        }
    }

    /// Find the network whose WIF version byte is `version`.
    pub fn from_priv_key_version(version: u8) -> Option<&'static Network> {
        [&LIVENET, &TESTNET]
            .into_iter()
            .find(|n| n.priv_key_version == version)
    }
}

impl Default for Network {
    fn default() -> Self {
        LIVENET
    }
}
