//! JSON-friendly mirrors of the Metaplex token-metadata account layouts.
//!
//! On-chain accounts are decoded with the layouts shipped by `mpl-token-metadata`
//! and mapped into the plain records below, which serialize public keys as
//! base58 strings.

use mpl_token_metadata::{
    accounts::{Edition, MasterEdition, Metadata},
    types::{self as mpl, Key},
};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use crate::error::{Error, Result};

/// The Metaplex token standards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStandard {
    NonFungible,
    FungibleAsset,
    Fungible,
    NonFungibleEdition,
    ProgrammableNonFungible,
    ProgrammableNonFungibleEdition,
}

impl TokenStandard {
    /// Returns `true` for standards whose metadata is paired with an edition account.
    pub fn has_edition(&self) -> bool {
        matches!(
            self,
            TokenStandard::NonFungible
                | TokenStandard::NonFungibleEdition
                | TokenStandard::ProgrammableNonFungible
                | TokenStandard::ProgrammableNonFungibleEdition
        )
    }
}

impl From<mpl::TokenStandard> for TokenStandard {
    fn from(standard: mpl::TokenStandard) -> Self {
        match standard {
            mpl::TokenStandard::NonFungible => TokenStandard::NonFungible,
            mpl::TokenStandard::FungibleAsset => TokenStandard::FungibleAsset,
            mpl::TokenStandard::Fungible => TokenStandard::Fungible,
            mpl::TokenStandard::NonFungibleEdition => TokenStandard::NonFungibleEdition,
            mpl::TokenStandard::ProgrammableNonFungible => TokenStandard::ProgrammableNonFungible,
            mpl::TokenStandard::ProgrammableNonFungibleEdition => {
                TokenStandard::ProgrammableNonFungibleEdition
            }
        }
    }
}

impl From<TokenStandard> for mpl::TokenStandard {
    fn from(standard: TokenStandard) -> Self {
        match standard {
            TokenStandard::NonFungible => mpl::TokenStandard::NonFungible,
            TokenStandard::FungibleAsset => mpl::TokenStandard::FungibleAsset,
            TokenStandard::Fungible => mpl::TokenStandard::Fungible,
            TokenStandard::NonFungibleEdition => mpl::TokenStandard::NonFungibleEdition,
            TokenStandard::ProgrammableNonFungible => mpl::TokenStandard::ProgrammableNonFungible,
            TokenStandard::ProgrammableNonFungibleEdition => {
                mpl::TokenStandard::ProgrammableNonFungibleEdition
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    #[serde(with = "serde_pubkey")]
    pub address: Pubkey,
    pub verified: bool,
    /// Share of royalties, in percent. Shares of all creators add up to 100.
    pub share: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub verified: bool,
    #[serde(with = "serde_pubkey")]
    pub key: Pubkey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UseMethod {
    Burn,
    Multiple,
    Single,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uses {
    pub use_method: UseMethod,
    pub remaining: u64,
    pub total: u64,
}

/// Edition information attached to non-fungible metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditionInfo {
    /// The original of an NFT. `max_supply` of `None` means unlimited prints.
    Master { supply: u64, max_supply: Option<u64> },
    /// A numbered print of a master edition.
    Print {
        #[serde(with = "serde_pubkey")]
        parent: Pubkey,
        edition: u64,
    },
}

/// The caller-facing part of a metadata account: what gets written on create/update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataData {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
    #[serde(default)]
    pub creators: Vec<Creator>,
    #[serde(default)]
    pub collection: Option<Collection>,
    #[serde(default)]
    pub uses: Option<Uses>,
}

/// A decoded metadata account, optionally with its edition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    #[serde(with = "serde_pubkey")]
    pub mint: Pubkey,
    #[serde(with = "serde_pubkey")]
    pub update_authority: Pubkey,
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
    pub creators: Vec<Creator>,
    pub primary_sale_happened: bool,
    pub is_mutable: bool,
    pub edition_nonce: Option<u8>,
    pub token_standard: Option<TokenStandard>,
    pub collection: Option<Collection>,
    pub uses: Option<Uses>,
    pub edition: Option<EditionInfo>,
}

/// A single trait in an off-chain metadata document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub trait_type: Option<String>,
    pub value: serde_json::Value,
}

/// The JSON document an on-chain `uri` points to.
///
/// Only the commonly used fields are typed; everything else is kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OffChainMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub animation_url: Option<String>,
    #[serde(default)]
    pub external_url: Option<String>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub properties: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl From<mpl::Creator> for Creator {
    fn from(c: mpl::Creator) -> Self {
        Self {
            address: c.address,
            verified: c.verified,
            share: c.share,
        }
    }
}

impl From<Creator> for mpl::Creator {
    fn from(c: Creator) -> Self {
        Self {
            address: c.address,
            verified: c.verified,
            share: c.share,
        }
    }
}

impl From<mpl::Collection> for Collection {
    fn from(c: mpl::Collection) -> Self {
        Self {
            verified: c.verified,
            key: c.key,
        }
    }
}

impl From<Collection> for mpl::Collection {
    fn from(c: Collection) -> Self {
        Self {
            verified: c.verified,
            key: c.key,
        }
    }
}

impl From<mpl::UseMethod> for UseMethod {
    fn from(m: mpl::UseMethod) -> Self {
        match m {
            mpl::UseMethod::Burn => UseMethod::Burn,
            mpl::UseMethod::Multiple => UseMethod::Multiple,
            mpl::UseMethod::Single => UseMethod::Single,
        }
    }
}

impl From<UseMethod> for mpl::UseMethod {
    fn from(m: UseMethod) -> Self {
        match m {
            UseMethod::Burn => mpl::UseMethod::Burn,
            UseMethod::Multiple => mpl::UseMethod::Multiple,
            UseMethod::Single => mpl::UseMethod::Single,
        }
    }
}

impl From<mpl::Uses> for Uses {
    fn from(u: mpl::Uses) -> Self {
        Self {
            use_method: u.use_method.into(),
            remaining: u.remaining,
            total: u.total,
        }
    }
}

impl From<Uses> for mpl::Uses {
    fn from(u: Uses) -> Self {
        Self {
            use_method: u.use_method.into(),
            remaining: u.remaining,
            total: u.total,
        }
    }
}

impl From<MetadataData> for mpl::DataV2 {
    fn from(data: MetadataData) -> Self {
        let creators = if data.creators.is_empty() {
            None
        } else {
            Some(data.creators.into_iter().map(Into::into).collect())
        };
        Self {
            name: data.name,
            symbol: data.symbol,
            uri: data.uri,
            seller_fee_basis_points: data.seller_fee_basis_points,
            creators,
            collection: data.collection.map(Into::into),
            uses: data.uses.map(Into::into),
        }
    }
}

impl From<Metadata> for TokenMetadata {
    fn from(m: Metadata) -> Self {
        Self {
            mint: m.mint,
            update_authority: m.update_authority,
            name: trim_padding(&m.name),
            symbol: trim_padding(&m.symbol),
            uri: trim_padding(&m.uri),
            seller_fee_basis_points: m.seller_fee_basis_points,
            creators: m
                .creators
                .unwrap_or_default()
                .into_iter()
                .map(Into::into)
                .collect(),
            primary_sale_happened: m.primary_sale_happened,
            is_mutable: m.is_mutable,
            edition_nonce: m.edition_nonce,
            token_standard: m.token_standard.map(Into::into),
            collection: m.collection.map(Into::into),
            uses: m.uses.map(Into::into),
            edition: None,
        }
    }
}

impl TokenMetadata {
    /// The writable part of the metadata, e.g. as a starting point for an update.
    pub fn data(&self) -> MetadataData {
        MetadataData {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            uri: self.uri.clone(),
            seller_fee_basis_points: self.seller_fee_basis_points,
            creators: self.creators.clone(),
            collection: self.collection.clone(),
            uses: self.uses.clone(),
        }
    }
}

/// On-chain strings are right-padded with NUL bytes to their maximum length.
fn trim_padding(s: &str) -> String {
    s.trim_end_matches('\0').to_string()
}

fn is_master_edition_key(key: u8) -> bool {
    key == Key::MasterEditionV1 as u8 || key == Key::MasterEditionV2 as u8
}

/// Decodes a metadata account.
pub fn decode_metadata(account: &Pubkey, data: &[u8]) -> Result<TokenMetadata> {
    if data.first() != Some(&(Key::MetadataV1 as u8)) {
        return Err(Error::InvalidAccountData {
            account: *account,
            reason: "not a metadata account".to_string(),
        });
    }
    let metadata = Metadata::from_bytes(data).map_err(|e| Error::InvalidAccountData {
        account: *account,
        reason: e.to_string(),
    })?;
    Ok(metadata.into())
}

/// Decodes an edition account, master or print.
pub fn decode_edition(account: &Pubkey, data: &[u8]) -> Result<EditionInfo> {
    let invalid = |reason: String| Error::InvalidAccountData {
        account: *account,
        reason,
    };

    match data.first() {
        Some(&key) if is_master_edition_key(key) => {
            let master = MasterEdition::from_bytes(data).map_err(|e| invalid(e.to_string()))?;
            Ok(EditionInfo::Master {
                supply: master.supply,
                max_supply: master.max_supply,
            })
        }
        Some(&key) if key == Key::EditionV1 as u8 => {
            let edition = Edition::from_bytes(data).map_err(|e| invalid(e.to_string()))?;
            Ok(EditionInfo::Print {
                parent: edition.parent,
                edition: edition.edition,
            })
        }
        _ => Err(invalid("not an edition account".to_string())),
    }
}

/// Decodes a master edition account and returns `(supply, max_supply)`.
///
/// Fails with [`Error::TokenIsNotMasterEdition`] when the account holds any
/// other Metaplex account type.
pub fn decode_master_edition(account: &Pubkey, data: &[u8]) -> Result<(u64, Option<u64>)> {
    match data.first() {
        Some(&key) if is_master_edition_key(key) => match decode_edition(account, data)? {
            EditionInfo::Master { supply, max_supply } => Ok((supply, max_supply)),
            EditionInfo::Print { .. } => Err(Error::TokenIsNotMasterEdition(*account)),
        },
        _ => Err(Error::TokenIsNotMasterEdition(*account)),
    }
}

pub(crate) mod serde_pubkey {
    use serde::{Deserialize, Deserializer, Serializer};
    use solana_sdk::pubkey::Pubkey;
    use std::str::FromStr;

    pub fn serialize<S>(pubkey: &Pubkey, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&pubkey.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Pubkey, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        Pubkey::from_str(&s).map_err(serde::de::Error::custom)
    }
}
