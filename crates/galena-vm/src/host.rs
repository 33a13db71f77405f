//! Host capability interface consumed by the engine.
//!
//! The blockchain runtime hands the engine a [`HostContext`]: storage,
//! balances, block metadata, logs, inter-contract calls and asset
//! operations all live behind it. The engine never interprets the state it
//! reads or writes through this trait.

use bytes::Bytes;
use galena_types::{Address, Hash};

/// Which entry point an invocation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// Run the contract's `main` entry.
    Call,
    /// Run the constructor: `hash_type` handshake, then `deploy`.
    Create,
}

/// Inputs to one contract invocation.
#[derive(Debug, Clone)]
pub struct Message {
    pub kind: CallKind,
    /// Contract being executed; also the instance-cache key.
    pub destination: Address,
    pub sender: Address,
    /// Value sent with the call, little-endian u128 on the wire.
    pub value: u128,
    /// Call data.
    pub data: Bytes,
    /// Gas budget for this invocation.
    pub gas: i64,
}

impl Message {
    /// Build a `main` invocation message.
    pub fn call(destination: Address, sender: Address, data: Bytes, gas: i64) -> Self {
        Self {
            kind: CallKind::Call,
            destination,
            sender,
            value: 0,
            data,
            gas,
        }
    }

    /// Build a `deploy` invocation message.
    pub fn create(destination: Address, sender: Address, data: Bytes, gas: i64) -> Self {
        Self {
            kind: CallKind::Create,
            destination,
            sender,
            value: 0,
            data,
            gas,
        }
    }

    /// Set the transferred value.
    pub fn with_value(mut self, value: u128) -> Self {
        self.value = value;
        self
    }
}

/// Block- and transaction-level metadata, queried per environment call.
#[derive(Debug, Clone, Default)]
pub struct TxContext {
    pub gas_price: u128,
    pub origin: Address,
    pub coinbase: Address,
    pub block_number: i64,
    pub block_timestamp: i64,
    pub block_gas_limit: i64,
    pub block_difficulty: [u8; 32],
}

/// Outcome of an inter-contract call or create performed by the host.
///
/// For a create, `output` carries the 20-byte address of the new contract
/// on success and the revert payload on failure.
#[derive(Debug, Clone, Default)]
pub struct CallOutcome {
    pub success: bool,
    pub output: Bytes,
    /// Gas remaining after the nested execution; the engine adopts this as
    /// the caller's new balance.
    pub gas_left: i64,
}

/// Capability object provided by the enclosing blockchain runtime.
///
/// Implementations use interior mutability; the engine calls every method
/// through a shared reference and may do so from multiple invocations
/// concurrently.
pub trait HostContext: Send + Sync {
    /// Load a fixed-size storage slot. Absent slots read as zero.
    fn storage_load(&self, address: &Address, key: &Hash) -> Hash;

    /// Store a fixed-size storage slot.
    fn storage_store(&self, address: &Address, key: &Hash, value: &Hash);

    /// Load a variable-length storage entry.
    fn get_storage(&self, address: &Address, key: &[u8]) -> Option<Bytes>;

    /// Store a variable-length storage entry.
    fn set_storage(&self, address: &Address, key: &[u8], value: &[u8]);

    /// Account balance.
    fn balance(&self, address: &Address) -> u128;

    /// Size of the code stored for `address`.
    fn code_size(&self, address: &Address) -> u32;

    /// Copy `buf.len()` bytes of `address`'s code starting at `offset`
    /// into `buf`, returning how many bytes were available. The engine
    /// zero-fills the remainder.
    fn copy_code(&self, address: &Address, offset: u32, buf: &mut [u8]) -> u32;

    /// Hash of the block at `number`, if within the visible window.
    fn block_hash(&self, number: u64) -> Option<Hash>;

    /// Current block and transaction metadata.
    fn tx_context(&self) -> TxContext;

    /// Append a log record.
    fn emit_log(&self, address: &Address, data: &[u8], topics: &[Hash]);

    /// Run a nested contract call.
    fn call(&self, msg: Message) -> CallOutcome;

    /// Deploy a new contract from `init_code`.
    fn create(&self, value: u128, init_code: Bytes, gas: i64) -> CallOutcome;

    /// Mark `address` for destruction, crediting `beneficiary`.
    fn self_destruct(&self, address: &Address, beneficiary: &Address);

    /// Hash algorithm the chain runs on: `false` = keccak256, `true` = sm3.
    /// Contracts must agree via their `hash_type` export before `deploy`.
    fn sm3_hash(&self) -> bool;

    // Asset operations. The defaults report failure so hosts without an
    // asset ledger need not implement them.

    fn register_asset(
        &self,
        _name: &[u8],
        _issuer: &Address,
        _fungible: bool,
        _total: u64,
        _description: &[u8],
    ) -> bool {
        false
    }

    fn issue_fungible_asset(&self, _to: &Address, _name: &[u8], _amount: u64) -> bool {
        false
    }

    /// Returns the new asset id, or 0 on failure.
    fn issue_not_fungible_asset(&self, _to: &Address, _name: &[u8], _uri: &[u8]) -> u64 {
        0
    }

    fn transfer_asset(
        &self,
        _to: &Address,
        _name: &[u8],
        _amount_or_id: u64,
        _from_self: bool,
    ) -> bool {
        false
    }

    fn asset_balance(&self, _account: &Address, _name: &[u8]) -> u64 {
        0
    }

    fn not_fungible_asset_ids(&self, _account: &Address, _name: &[u8]) -> Vec<u64> {
        Vec::new()
    }

    /// Metadata (URI) of one non-fungible asset instance.
    fn not_fungible_asset_info(
        &self,
        _account: &Address,
        _name: &[u8],
        _asset_id: u64,
    ) -> Option<Bytes> {
        None
    }
}
