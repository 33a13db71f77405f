//! Shared test host for engine integration tests.

#![allow(dead_code)]

use std::collections::HashMap;

use bytes::Bytes;
use galena_types::{Address, Hash};
use galena_vm::{CallOutcome, HostContext, Message, TxContext};
use parking_lot::Mutex;

pub struct LogRecord {
    pub address: Address,
    pub data: Vec<u8>,
    pub topics: Vec<Hash>,
}

/// In-memory host backed by hash maps. Interior mutability throughout so
/// the engine can drive it through a shared reference from many threads.
pub struct MockHost {
    pub sm3: bool,
    pub tx: TxContext,
    pub storage: Mutex<HashMap<(Address, Hash), Hash>>,
    pub kv: Mutex<HashMap<(Address, Vec<u8>), Bytes>>,
    pub logs: Mutex<Vec<LogRecord>>,
    pub destructed: Mutex<Vec<(Address, Address)>>,
    pub calls: Mutex<Vec<Message>>,
}

impl Default for MockHost {
    fn default() -> Self {
        Self {
            sm3: false,
            tx: TxContext {
                gas_price: 3,
                origin: Address::from_bytes([0x0e; 20]),
                coinbase: Address::from_bytes([0xc0; 20]),
                block_number: 42,
                block_timestamp: 1_690_000_000,
                block_gas_limit: 30_000_000,
                block_difficulty: [0x0d; 32],
            },
            storage: Mutex::new(HashMap::new()),
            kv: Mutex::new(HashMap::new()),
            logs: Mutex::new(Vec::new()),
            destructed: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl MockHost {
    pub fn with_sm3() -> Self {
        Self {
            sm3: true,
            ..Self::default()
        }
    }
}

impl HostContext for MockHost {
    fn storage_load(&self, address: &Address, key: &Hash) -> Hash {
        self.storage
            .lock()
            .get(&(*address, *key))
            .copied()
            .unwrap_or_default()
    }

    fn storage_store(&self, address: &Address, key: &Hash, value: &Hash) {
        self.storage.lock().insert((*address, *key), *value);
    }

    fn get_storage(&self, address: &Address, key: &[u8]) -> Option<Bytes> {
        self.kv.lock().get(&(*address, key.to_vec())).cloned()
    }

    fn set_storage(&self, address: &Address, key: &[u8], value: &[u8]) {
        self.kv
            .lock()
            .insert((*address, key.to_vec()), Bytes::copy_from_slice(value));
    }

    fn balance(&self, _address: &Address) -> u128 {
        1_000_000_000
    }

    fn code_size(&self, _address: &Address) -> u32 {
        8
    }

    fn copy_code(&self, _address: &Address, offset: u32, buf: &mut [u8]) -> u32 {
        let code: [u8; 8] = [1, 2, 3, 4, 5, 6, 7, 8];
        let offset = offset as usize;
        if offset >= code.len() {
            return 0;
        }
        let n = buf.len().min(code.len() - offset);
        buf[..n].copy_from_slice(&code[offset..offset + n]);
        n as u32
    }

    fn block_hash(&self, number: u64) -> Option<Hash> {
        (number <= 42).then(|| Hash::from_bytes([number as u8; 32]))
    }

    fn tx_context(&self) -> TxContext {
        self.tx.clone()
    }

    fn emit_log(&self, address: &Address, data: &[u8], topics: &[Hash]) {
        self.logs.lock().push(LogRecord {
            address: *address,
            data: data.to_vec(),
            topics: topics.to_vec(),
        });
    }

    fn call(&self, msg: Message) -> CallOutcome {
        let gas_left = msg.gas - 100;
        self.calls.lock().push(msg);
        CallOutcome {
            success: true,
            output: Bytes::from_static(b"pong"),
            gas_left,
        }
    }

    fn create(&self, _value: u128, _init_code: Bytes, gas: i64) -> CallOutcome {
        CallOutcome {
            success: true,
            output: Bytes::copy_from_slice(&[0xcc; 20]),
            gas_left: gas - 1_000,
        }
    }

    fn self_destruct(&self, address: &Address, beneficiary: &Address) {
        self.destructed.lock().push((*address, *beneficiary));
    }

    fn sm3_hash(&self) -> bool {
        self.sm3
    }
}
