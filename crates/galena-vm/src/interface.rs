//! Per-invocation bridge between guest imports and the [`HostContext`].
//!
//! A [`HostInterface`] is built at `execute` entry, installed into the
//! claimed instance's store for the duration of the run, and taken back out
//! before the instance returns to the pool. Import trampolines reach it
//! through the store data; it never outlives the invocation.

use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use bytes::Bytes;
use galena_types::{Address, Hash};
use wasmtime::Memory;

use crate::error::HostTrap;
use crate::executor::ExecutionResult;
use crate::gas::GasSchedule;
use crate::host::{HostContext, Message};
use crate::memory::GuestMemory;
use crate::MAX_STORAGE_VALUE_LEN;

/// Store data of every cached instance. Both slots are rebound when the
/// instance is claimed for an invocation.
#[derive(Default)]
pub(crate) struct HostState {
    pub interface: Option<HostInterface>,
    pub memory: Option<Memory>,
}

impl HostState {
    pub fn interface_mut(&mut self) -> Result<&mut HostInterface> {
        self.interface
            .as_mut()
            .ok_or_else(|| anyhow!("no active invocation bound to this instance"))
    }
}

pub(crate) struct HostInterface {
    host: Arc<dyn HostContext>,
    /// Code stored for the executing account, backing codeCopy/getCodeSize.
    code: Bytes,
    msg: Message,
    result: ExecutionResult,
    /// Output of the most recent nested call or create.
    return_data: Bytes,
    meter_gas: bool,
    schedule: GasSchedule,
}

impl HostInterface {
    pub fn new(
        host: Arc<dyn HostContext>,
        code: Bytes,
        msg: Message,
        meter_gas: bool,
        schedule: GasSchedule,
    ) -> Self {
        let result = ExecutionResult {
            gas_left: msg.gas,
            is_revert: false,
            return_value: Bytes::new(),
        };
        Self {
            host,
            code,
            msg,
            result,
            return_data: Bytes::new(),
            meter_gas,
            schedule,
        }
    }

    pub fn into_result(self) -> ExecutionResult {
        self.result
    }

    // ------------------------------------------------------------------
    // Gas
    // ------------------------------------------------------------------

    pub fn use_gas(&mut self, gas: i64) -> Result<()> {
        tracing::trace!(gas, left = self.result.gas_left, "useGas");
        if gas < 0 {
            bail!("Negative gas supplied.");
        }
        self.take_gas(gas)
    }

    pub fn gas_left(&self) -> i64 {
        self.result.gas_left
    }

    fn take_gas(&mut self, gas: i64) -> Result<()> {
        self.result.gas_left = self.result.gas_left.saturating_sub(gas);
        if self.result.gas_left < 0 {
            return Err(HostTrap::OutOfGas.into());
        }
        Ok(())
    }

    /// Charge the interface schedule when metering is on. Side effects of a
    /// host call only happen after the charge succeeds.
    fn take_interface_gas(&mut self, cost: u64) -> Result<()> {
        if !self.meter_gas {
            return Ok(());
        }
        self.take_gas(i64::try_from(cost).unwrap_or(i64::MAX))
    }

    fn charge_copy(&mut self, len: u32) -> Result<()> {
        let cost = self.schedule.copy_cost(len);
        self.take_interface_gas(cost)
    }

    // ------------------------------------------------------------------
    // Invocation context
    // ------------------------------------------------------------------

    pub fn get_address(&self, mem: &mut GuestMemory<'_>, result_offset: u32) -> Result<()> {
        mem.write(result_offset, self.msg.destination.as_bytes())?;
        Ok(())
    }

    pub fn get_caller(&self, mem: &mut GuestMemory<'_>, result_offset: u32) -> Result<()> {
        mem.write(result_offset, self.msg.sender.as_bytes())?;
        Ok(())
    }

    pub fn get_call_value(&self, mem: &mut GuestMemory<'_>, result_offset: u32) -> Result<()> {
        mem.write(result_offset, &self.msg.value.to_le_bytes())?;
        Ok(())
    }

    pub fn call_data_size(&self) -> i32 {
        self.msg.data.len() as i32
    }

    pub fn call_data_copy(
        &mut self,
        mem: &mut GuestMemory<'_>,
        result_offset: u32,
        data_offset: u32,
        length: u32,
    ) -> Result<()> {
        self.charge_copy(length)?;
        copy_from(&self.msg.data, mem, result_offset, data_offset, length)
    }

    /// One-shot variant: the whole call data at `result_offset`.
    pub fn get_call_data(&mut self, mem: &mut GuestMemory<'_>, result_offset: u32) -> Result<()> {
        let len = self.msg.data.len() as u32;
        self.charge_copy(len)?;
        mem.write(result_offset, &self.msg.data)?;
        Ok(())
    }

    pub fn code_size(&self) -> i32 {
        self.code.len() as i32
    }

    pub fn code_copy(
        &mut self,
        mem: &mut GuestMemory<'_>,
        result_offset: u32,
        code_offset: u32,
        length: u32,
    ) -> Result<()> {
        self.charge_copy(length)?;
        copy_from(&self.code, mem, result_offset, code_offset, length)
    }

    // ------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------

    pub fn get_external_balance(
        &mut self,
        mem: &mut GuestMemory<'_>,
        address_offset: u32,
        result_offset: u32,
    ) -> Result<()> {
        self.take_interface_gas(self.schedule.balance)?;
        let address = Address::from_bytes(mem.read_fixed::<20>(address_offset)?);
        let balance = self.host.balance(&address);
        mem.write(result_offset, &balance.to_le_bytes())?;
        Ok(())
    }

    pub fn external_code_size(
        &mut self,
        mem: &mut GuestMemory<'_>,
        address_offset: u32,
    ) -> Result<i32> {
        self.take_interface_gas(self.schedule.external_code)?;
        let address = Address::from_bytes(mem.read_fixed::<20>(address_offset)?);
        Ok(self.host.code_size(&address) as i32)
    }

    pub fn external_code_copy(
        &mut self,
        mem: &mut GuestMemory<'_>,
        address_offset: u32,
        result_offset: u32,
        code_offset: u32,
        length: u32,
    ) -> Result<()> {
        self.take_interface_gas(self.schedule.external_code)?;
        self.charge_copy(length)?;
        let address = Address::from_bytes(mem.read_fixed::<20>(address_offset)?);
        // Past-the-end reads of external code zero-fill, as EVM does.
        let mut buf = vec![0u8; length as usize];
        self.host.copy_code(&address, code_offset, &mut buf);
        mem.write(result_offset, &buf)?;
        Ok(())
    }

    pub fn self_destruct(&mut self, mem: &mut GuestMemory<'_>, address_offset: u32) -> Result<()> {
        self.take_interface_gas(self.schedule.self_destruct)?;
        let beneficiary = Address::from_bytes(mem.read_fixed::<20>(address_offset)?);
        self.host.self_destruct(&self.msg.destination, &beneficiary);
        // Terminal, like finish with an empty payload.
        self.result.is_revert = false;
        Err(HostTrap::Finish.into())
    }

    // ------------------------------------------------------------------
    // Block / transaction metadata
    // ------------------------------------------------------------------

    pub fn get_block_hash(
        &self,
        mem: &mut GuestMemory<'_>,
        number: i64,
        result_offset: u32,
    ) -> Result<i32> {
        match self.host.block_hash(number as u64) {
            Some(hash) => {
                mem.write(result_offset, hash.as_bytes())?;
                Ok(0)
            }
            None => Ok(1),
        }
    }

    pub fn get_block_coinbase(&self, mem: &mut GuestMemory<'_>, result_offset: u32) -> Result<()> {
        let coinbase = self.host.tx_context().coinbase;
        mem.write(result_offset, coinbase.as_bytes())?;
        Ok(())
    }

    pub fn get_block_difficulty(
        &self,
        mem: &mut GuestMemory<'_>,
        result_offset: u32,
    ) -> Result<()> {
        let difficulty = self.host.tx_context().block_difficulty;
        mem.write(result_offset, &difficulty)?;
        Ok(())
    }

    pub fn block_gas_limit(&self) -> i64 {
        self.host.tx_context().block_gas_limit
    }

    pub fn block_number(&self) -> i64 {
        self.host.tx_context().block_number
    }

    pub fn block_timestamp(&self) -> i64 {
        self.host.tx_context().block_timestamp
    }

    pub fn get_tx_gas_price(&self, mem: &mut GuestMemory<'_>, value_offset: u32) -> Result<()> {
        let price = self.host.tx_context().gas_price;
        mem.write(value_offset, &price.to_le_bytes())?;
        Ok(())
    }

    pub fn get_tx_origin(&self, mem: &mut GuestMemory<'_>, result_offset: u32) -> Result<()> {
        let origin = self.host.tx_context().origin;
        mem.write(result_offset, origin.as_bytes())?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Logs
    // ------------------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    pub fn log(
        &mut self,
        mem: &mut GuestMemory<'_>,
        data_offset: u32,
        length: u32,
        number_of_topics: u32,
        topic_offsets: [u32; 4],
    ) -> Result<()> {
        if number_of_topics > 4 {
            return Err(HostTrap::MemoryAccess.into());
        }
        let cost = self.schedule.log_base
            + self.schedule.log_per_topic * u64::from(number_of_topics)
            + self.schedule.log_per_byte * u64::from(length);
        self.take_interface_gas(cost)?;

        let mut topics = Vec::with_capacity(number_of_topics as usize);
        for offset in topic_offsets.iter().take(number_of_topics as usize) {
            topics.push(Hash::from_bytes(mem.read_fixed::<32>(*offset)?));
        }
        let data = mem.read(data_offset, length)?;
        self.host.emit_log(&self.msg.destination, data, &topics);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Storage
    // ------------------------------------------------------------------

    pub fn storage_store(
        &mut self,
        mem: &mut GuestMemory<'_>,
        path_offset: u32,
        value_offset: u32,
    ) -> Result<()> {
        self.take_interface_gas(self.schedule.storage_store)?;
        let key = Hash::from_bytes(mem.read_fixed::<32>(path_offset)?);
        let value = Hash::from_bytes(mem.read_fixed::<32>(value_offset)?);
        self.host.storage_store(&self.msg.destination, &key, &value);
        Ok(())
    }

    pub fn storage_load(
        &mut self,
        mem: &mut GuestMemory<'_>,
        path_offset: u32,
        result_offset: u32,
    ) -> Result<()> {
        self.take_interface_gas(self.schedule.storage_load)?;
        let key = Hash::from_bytes(mem.read_fixed::<32>(path_offset)?);
        let value = self.host.storage_load(&self.msg.destination, &key);
        mem.write(result_offset, value.as_bytes())?;
        Ok(())
    }

    pub fn set_storage(
        &mut self,
        mem: &mut GuestMemory<'_>,
        key_offset: u32,
        key_length: u32,
        value_offset: u32,
        value_length: u32,
    ) -> Result<()> {
        self.take_interface_gas(self.schedule.storage_store)?;
        let key = mem.read(key_offset, key_length)?;
        let value = mem.read(value_offset, value_length)?;
        self.host.set_storage(&self.msg.destination, key, value);
        Ok(())
    }

    /// Variable-length load; the copy-out is hard-capped at
    /// [`MAX_STORAGE_VALUE_LEN`] bytes regardless of the stored size.
    /// Returns the number of bytes written; a missing key writes nothing
    /// and returns 0.
    pub fn get_storage(
        &mut self,
        mem: &mut GuestMemory<'_>,
        key_offset: u32,
        key_length: u32,
        value_offset: u32,
    ) -> Result<i32> {
        self.take_interface_gas(self.schedule.storage_load)?;
        let key = mem.read(key_offset, key_length)?.to_vec();
        let value = match self.host.get_storage(&self.msg.destination, &key) {
            Some(value) => value,
            None => return Ok(0),
        };
        let len = value.len().min(MAX_STORAGE_VALUE_LEN);
        self.charge_copy(len as u32)?;
        mem.write(value_offset, &value[..len])?;
        Ok(len as i32)
    }

    // ------------------------------------------------------------------
    // Termination
    // ------------------------------------------------------------------

    pub fn finish(&mut self, mem: &GuestMemory<'_>, offset: u32, size: u32) -> Result<()> {
        self.terminate(mem, false, offset, size)
    }

    pub fn revert(&mut self, mem: &GuestMemory<'_>, offset: u32, size: u32) -> Result<()> {
        self.terminate(mem, true, offset, size)
    }

    /// Copy the guest payload out and unwind via the typed sentinel. Always
    /// returns an error: these calls never return to the guest.
    fn terminate(
        &mut self,
        mem: &GuestMemory<'_>,
        revert: bool,
        offset: u32,
        size: u32,
    ) -> Result<()> {
        tracing::trace!(
            revert,
            memory = mem.size(),
            offset,
            size,
            "terminating guest call"
        );
        if size != 0 {
            self.result.return_value = Bytes::copy_from_slice(mem.read(offset, size)?);
        }
        self.result.is_revert = revert;
        Err(if revert {
            HostTrap::Revert.into()
        } else {
            HostTrap::Finish.into()
        })
    }

    // ------------------------------------------------------------------
    // Nested calls
    // ------------------------------------------------------------------

    pub fn return_data_size(&self) -> i32 {
        self.return_data.len() as i32
    }

    pub fn return_data_copy(
        &mut self,
        mem: &mut GuestMemory<'_>,
        result_offset: u32,
        data_offset: u32,
        size: u32,
    ) -> Result<()> {
        self.charge_copy(size)?;
        copy_from(&self.return_data, mem, result_offset, data_offset, size)
    }

    /// One-shot variant: the whole return buffer at `result_offset`.
    pub fn get_return_data(&mut self, mem: &mut GuestMemory<'_>, result_offset: u32) -> Result<()> {
        let len = self.return_data.len() as u32;
        self.charge_copy(len)?;
        mem.write(result_offset, &self.return_data)?;
        Ok(())
    }

    /// Inter-contract call. All remaining gas is forwarded; the callee's
    /// leftover becomes the caller's new balance.
    pub fn call_contract(
        &mut self,
        mem: &mut GuestMemory<'_>,
        address_offset: u32,
        data_offset: u32,
        data_length: u32,
    ) -> Result<i32> {
        self.take_interface_gas(self.schedule.call_base)?;
        let destination = Address::from_bytes(mem.read_fixed::<20>(address_offset)?);
        let data = Bytes::copy_from_slice(mem.read(data_offset, data_length)?);

        let gas_before = self.result.gas_left;
        let msg = Message::call(destination, self.msg.destination, data, gas_before);
        let outcome = self.host.call(msg);

        self.result.gas_left = outcome.gas_left.min(gas_before);
        self.return_data = outcome.output;
        if self.result.gas_left < 0 {
            return Err(HostTrap::OutOfGas.into());
        }
        Ok(if outcome.success { 0 } else { 1 })
    }

    /// Deploy a new contract. Writes the 20-byte address of the created
    /// contract at `result_offset` and returns 0 on success, 1 on failure.
    pub fn create_contract(
        &mut self,
        mem: &mut GuestMemory<'_>,
        value_offset: u32,
        data_offset: u32,
        length: u32,
        result_offset: u32,
    ) -> Result<i32> {
        self.take_interface_gas(self.schedule.create_base)?;
        let value = u128::from_le_bytes(mem.read_fixed::<16>(value_offset)?);
        let init_code = Bytes::copy_from_slice(mem.read(data_offset, length)?);

        let gas_before = self.result.gas_left;
        let outcome = self.host.create(value, init_code, gas_before);

        self.result.gas_left = outcome.gas_left.min(gas_before);
        if self.result.gas_left < 0 {
            return Err(HostTrap::OutOfGas.into());
        }
        if outcome.success && outcome.output.len() == Address::LEN {
            mem.write(result_offset, &outcome.output)?;
            self.return_data = Bytes::new();
            Ok(0)
        } else {
            self.return_data = outcome.output;
            Ok(1)
        }
    }

    // ------------------------------------------------------------------
    // Assets
    // ------------------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    pub fn register_asset(
        &mut self,
        mem: &mut GuestMemory<'_>,
        name_offset: u32,
        name_length: u32,
        address_offset: u32,
        fungible: i32,
        total: i64,
        description_offset: u32,
        description_length: u32,
    ) -> Result<i32> {
        self.take_interface_gas(self.schedule.asset_op)?;
        let issuer = Address::from_bytes(mem.read_fixed::<20>(address_offset)?);
        let name = mem.read(name_offset, name_length)?;
        let description = mem.read(description_offset, description_length)?;
        let ok = self
            .host
            .register_asset(name, &issuer, fungible != 0, total as u64, description);
        Ok(status(ok))
    }

    pub fn issue_fungible_asset(
        &mut self,
        mem: &mut GuestMemory<'_>,
        address_offset: u32,
        name_offset: u32,
        name_length: u32,
        amount: i64,
    ) -> Result<i32> {
        self.take_interface_gas(self.schedule.asset_op)?;
        let to = Address::from_bytes(mem.read_fixed::<20>(address_offset)?);
        let name = mem.read(name_offset, name_length)?;
        let ok = self.host.issue_fungible_asset(&to, name, amount as u64);
        Ok(status(ok))
    }

    pub fn issue_not_fungible_asset(
        &mut self,
        mem: &mut GuestMemory<'_>,
        address_offset: u32,
        name_offset: u32,
        name_length: u32,
        uri_offset: u32,
        uri_length: u32,
    ) -> Result<i64> {
        self.take_interface_gas(self.schedule.asset_op)?;
        let to = Address::from_bytes(mem.read_fixed::<20>(address_offset)?);
        let name = mem.read(name_offset, name_length)?;
        let uri = mem.read(uri_offset, uri_length)?;
        Ok(self.host.issue_not_fungible_asset(&to, name, uri) as i64)
    }

    pub fn transfer_asset(
        &mut self,
        mem: &mut GuestMemory<'_>,
        address_offset: u32,
        name_offset: u32,
        name_length: u32,
        amount_or_id: i64,
        from_self: i32,
    ) -> Result<i32> {
        self.take_interface_gas(self.schedule.asset_op)?;
        let to = Address::from_bytes(mem.read_fixed::<20>(address_offset)?);
        let name = mem.read(name_offset, name_length)?;
        let ok = self
            .host
            .transfer_asset(&to, name, amount_or_id as u64, from_self != 0);
        Ok(status(ok))
    }

    pub fn asset_balance(
        &mut self,
        mem: &mut GuestMemory<'_>,
        address_offset: u32,
        name_offset: u32,
        name_length: u32,
    ) -> Result<i64> {
        self.take_interface_gas(self.schedule.asset_op)?;
        let account = Address::from_bytes(mem.read_fixed::<20>(address_offset)?);
        let name = mem.read(name_offset, name_length)?;
        Ok(self.host.asset_balance(&account, name) as i64)
    }

    /// Writes consecutive little-endian u64 ids, truncated to the guest's
    /// buffer, and returns how many were written.
    pub fn not_fungible_asset_ids(
        &mut self,
        mem: &mut GuestMemory<'_>,
        address_offset: u32,
        name_offset: u32,
        name_length: u32,
        result_offset: u32,
        result_length: u32,
    ) -> Result<i32> {
        self.take_interface_gas(self.schedule.asset_op)?;
        let account = Address::from_bytes(mem.read_fixed::<20>(address_offset)?);
        let ids = {
            let name = mem.read(name_offset, name_length)?;
            self.host.not_fungible_asset_ids(&account, name)
        };
        let fit = (result_length as usize / 8).min(ids.len());
        let mut offset = result_offset;
        for id in ids.iter().take(fit) {
            mem.write(offset, &id.to_le_bytes())?;
            offset += 8;
        }
        Ok(fit as i32)
    }

    /// Writes the asset's metadata (truncated to the guest's buffer) and
    /// returns 0, or 1 when the asset is unknown.
    #[allow(clippy::too_many_arguments)]
    pub fn not_fungible_asset_info(
        &mut self,
        mem: &mut GuestMemory<'_>,
        address_offset: u32,
        name_offset: u32,
        name_length: u32,
        asset_id: i64,
        result_offset: u32,
        result_length: u32,
    ) -> Result<i32> {
        self.take_interface_gas(self.schedule.asset_op)?;
        let account = Address::from_bytes(mem.read_fixed::<20>(address_offset)?);
        let info = {
            let name = mem.read(name_offset, name_length)?;
            self.host
                .not_fungible_asset_info(&account, name, asset_id as u64)
        };
        match info {
            Some(info) => {
                let len = info.len().min(result_length as usize);
                mem.write(result_offset, &info[..len])?;
                Ok(0)
            }
            None => Ok(1),
        }
    }

    // ------------------------------------------------------------------
    // Debug interface
    // ------------------------------------------------------------------

    #[cfg(feature = "debug-interface")]
    pub fn debug_print_mem(
        &self,
        mem: &GuestMemory<'_>,
        as_hex: bool,
        offset: u32,
        size: u32,
    ) -> Result<()> {
        let data = mem.read(offset, size)?;
        if as_hex {
            tracing::debug!(target: "galena_vm::guest", "printMemHex: {}", hex::encode(data));
        } else {
            tracing::debug!(target: "galena_vm::guest", "printMem: {}", String::from_utf8_lossy(data));
        }
        Ok(())
    }

    #[cfg(feature = "debug-interface")]
    pub fn debug_print_storage(
        &self,
        mem: &GuestMemory<'_>,
        as_hex: bool,
        path_offset: u32,
    ) -> Result<()> {
        let key = Hash::from_bytes(mem.read_fixed::<32>(path_offset)?);
        let value = self.host.storage_load(&self.msg.destination, &key);
        if as_hex {
            tracing::debug!(target: "galena_vm::guest", %key, "printStorageHex: {}", value.to_hex());
        } else {
            tracing::debug!(
                target: "galena_vm::guest",
                %key,
                "printStorage: {}",
                String::from_utf8_lossy(value.as_bytes())
            );
        }
        Ok(())
    }
}

/// Copy `[data_offset, data_offset + length)` out of a host-side buffer
/// into guest memory. Reading past the end of the source is an invalid
/// memory access, mirroring the bounds rule for guest offsets.
fn copy_from(
    source: &[u8],
    mem: &mut GuestMemory<'_>,
    result_offset: u32,
    data_offset: u32,
    length: u32,
) -> Result<()> {
    let start = u64::from(data_offset);
    let end = start + u64::from(length);
    if end > source.len() as u64 {
        return Err(HostTrap::MemoryAccess.into());
    }
    mem.write(result_offset, &source[start as usize..end as usize])?;
    Ok(())
}

fn status(ok: bool) -> i32 {
    if ok {
        0
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{CallOutcome, TxContext};
    use parking_lot::Mutex;
    use std::collections::HashMap;

    #[derive(Default)]
    struct TestHost {
        storage: Mutex<HashMap<(Address, Hash), Hash>>,
        kv: Mutex<HashMap<(Address, Vec<u8>), Bytes>>,
        logs: Mutex<Vec<(Vec<u8>, Vec<Hash>)>>,
    }

    impl HostContext for TestHost {
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
            self.kv.lock().insert(
                (*address, key.to_vec()),
                Bytes::copy_from_slice(value),
            );
        }

        fn balance(&self, _address: &Address) -> u128 {
            42
        }

        fn code_size(&self, _address: &Address) -> u32 {
            0
        }

        fn copy_code(&self, _address: &Address, _offset: u32, _buf: &mut [u8]) -> u32 {
            0
        }

        fn block_hash(&self, number: u64) -> Option<Hash> {
            (number < 100).then(|| Hash::from_bytes([0xbb; 32]))
        }

        fn tx_context(&self) -> TxContext {
            TxContext {
                block_number: 7,
                ..TxContext::default()
            }
        }

        fn emit_log(&self, _address: &Address, data: &[u8], topics: &[Hash]) {
            self.logs.lock().push((data.to_vec(), topics.to_vec()));
        }

        fn call(&self, msg: Message) -> CallOutcome {
            CallOutcome {
                success: true,
                output: Bytes::from_static(b"pong"),
                gas_left: msg.gas - 100,
            }
        }

        fn create(&self, _value: u128, _init_code: Bytes, gas: i64) -> CallOutcome {
            CallOutcome {
                success: true,
                output: Bytes::copy_from_slice(&[0xcc; 20]),
                gas_left: gas - 1_000,
            }
        }

        fn self_destruct(&self, _address: &Address, _beneficiary: &Address) {}

        fn sm3_hash(&self) -> bool {
            false
        }
    }

    fn test_interface(gas: i64, meter_gas: bool) -> HostInterface {
        let msg = Message::call(
            Address::from_bytes([1u8; 20]),
            Address::from_bytes([2u8; 20]),
            Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]),
            gas,
        );
        HostInterface::new(
            Arc::new(TestHost::default()),
            Bytes::from_static(&[0x00, 0x61, 0x73, 0x6d]),
            msg,
            meter_gas,
            GasSchedule::default(),
        )
    }

    #[test]
    fn test_use_gas_accounting() {
        let mut iface = test_interface(1_000, false);
        iface.use_gas(300).unwrap();
        iface.use_gas(200).unwrap();
        assert_eq!(iface.gas_left(), 500);
    }

    #[test]
    fn test_use_gas_underflow_is_out_of_gas() {
        let mut iface = test_interface(100, false);
        let err = iface.use_gas(101).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HostTrap>(),
            Some(HostTrap::OutOfGas)
        ));
        assert!(iface.gas_left() < 0);
    }

    #[test]
    fn test_negative_gas_message() {
        let mut iface = test_interface(100, false);
        let err = iface.use_gas(-1).unwrap_err();
        assert!(err.downcast_ref::<HostTrap>().is_none());
        assert_eq!(err.to_string(), "Negative gas supplied.");
    }

    #[test]
    fn test_finish_empty_payload() {
        let mut backing = vec![0u8; 64];
        let mem = GuestMemory::new(&mut backing);
        let mut iface = test_interface(1_000, false);

        let err = iface.finish(&mem, 0, 0).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HostTrap>(),
            Some(HostTrap::Finish)
        ));
        let result = iface.into_result();
        assert!(!result.is_revert);
        assert!(result.return_value.is_empty());
    }

    #[test]
    fn test_revert_copies_payload() {
        let mut backing = vec![0u8; 128];
        let mut mem = GuestMemory::new(&mut backing);
        mem.write(100, &[0xde, 0xad, 0xbe, 0xef]).unwrap();

        let mut iface = test_interface(1_000, false);
        let err = iface.revert(&mem, 100, 4).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HostTrap>(),
            Some(HostTrap::Revert)
        ));
        let result = iface.into_result();
        assert!(result.is_revert);
        assert_eq!(&result.return_value[..], &[0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_finish_out_of_bounds_payload() {
        let mut backing = vec![0u8; 16];
        let mem = GuestMemory::new(&mut backing);
        let mut iface = test_interface(1_000, false);

        let err = iface.finish(&mem, 8, 16).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HostTrap>(),
            Some(HostTrap::MemoryAccess)
        ));
    }

    #[test]
    fn test_call_data_copy_source_bounds() {
        let mut backing = vec![0u8; 64];
        let mut mem = GuestMemory::new(&mut backing);
        let mut iface = test_interface(1_000, false);

        // Call data is 4 bytes; reading 5 from it must fail.
        let err = iface.call_data_copy(&mut mem, 0, 0, 5).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HostTrap>(),
            Some(HostTrap::MemoryAccess)
        ));

        iface.call_data_copy(&mut mem, 0, 2, 2).unwrap();
        assert_eq!(mem.read(0, 2).unwrap(), &[0xbe, 0xef]);
    }

    #[test]
    fn test_get_storage_caps_copy_out() {
        let mut backing = vec![0u8; 32 * 1024];
        let mut mem = GuestMemory::new(&mut backing);
        let mut iface = test_interface(1_000_000, false);

        mem.write(0, b"key").unwrap();
        let oversized = vec![0x7f; MAX_STORAGE_VALUE_LEN + 1_000];
        iface.set_storage(&mut mem, 0, 3, 0, 0).unwrap();
        iface
            .host
            .set_storage(&iface.msg.destination, b"key", &oversized);

        let written = iface.get_storage(&mut mem, 0, 3, 64).unwrap();
        assert_eq!(written as usize, MAX_STORAGE_VALUE_LEN);
    }

    #[test]
    fn test_get_storage_missing_key() {
        let mut backing = vec![0u8; 64];
        let mut mem = GuestMemory::new(&mut backing);
        let mut iface = test_interface(1_000, false);

        mem.write(0, b"nothing-here").unwrap();
        assert_eq!(iface.get_storage(&mut mem, 0, 12, 32).unwrap(), 0);
    }

    #[test]
    fn test_metered_interface_charges_schedule() {
        let mut backing = vec![0u8; 128];
        let mut mem = GuestMemory::new(&mut backing);
        let mut iface = test_interface(1_000_000, true);
        let schedule = GasSchedule::default();

        iface.storage_store(&mut mem, 0, 32).unwrap();
        assert_eq!(
            iface.gas_left(),
            1_000_000 - schedule.storage_store as i64
        );
    }

    #[test]
    fn test_unmetered_interface_is_free() {
        let mut backing = vec![0u8; 128];
        let mut mem = GuestMemory::new(&mut backing);
        let mut iface = test_interface(1_000_000, false);

        iface.storage_store(&mut mem, 0, 32).unwrap();
        assert_eq!(iface.gas_left(), 1_000_000);
    }

    #[test]
    fn test_call_adopts_callee_gas_and_return_data() {
        let mut backing = vec![0u8; 128];
        let mut mem = GuestMemory::new(&mut backing);
        mem.write(0, &[0x11; 20]).unwrap();
        let mut iface = test_interface(10_000, false);

        let code = iface.call_contract(&mut mem, 0, 20, 0).unwrap();
        assert_eq!(code, 0);
        assert_eq!(iface.gas_left(), 9_900);
        assert_eq!(iface.return_data_size(), 4);

        iface.get_return_data(&mut mem, 40).unwrap();
        assert_eq!(mem.read(40, 4).unwrap(), b"pong");
    }

    #[test]
    fn test_create_writes_address() {
        let mut backing = vec![0u8; 128];
        let mut mem = GuestMemory::new(&mut backing);
        let mut iface = test_interface(100_000, false);

        let code = iface.create_contract(&mut mem, 0, 16, 4, 64).unwrap();
        assert_eq!(code, 0);
        assert_eq!(mem.read(64, 20).unwrap(), &[0xcc; 20]);
        assert_eq!(iface.gas_left(), 99_000);
    }

    #[test]
    fn test_log_rejects_too_many_topics() {
        let mut backing = vec![0u8; 256];
        let mut mem = GuestMemory::new(&mut backing);
        let mut iface = test_interface(1_000_000, false);

        let err = iface.log(&mut mem, 0, 4, 5, [0; 4]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HostTrap>(),
            Some(HostTrap::MemoryAccess)
        ));
    }
}
