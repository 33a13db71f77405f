//! Process-wide catalogue of importable environment functions.
//!
//! For each `(namespace, name)` pair the registry holds the WASM signature
//! and a trampoline that unpacks positional arguments, forwards to the
//! bound [`HostInterface`], and packs the result. Built once, then
//! consulted concurrently without locking.

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use wasmtime::{AsContextMut, Caller, Engine, FuncType, Val, ValType};

use crate::interface::{HostInterface, HostState};
use crate::memory::GuestMemory;

pub(crate) const MODULE_ETHEREUM: &str = "ethereum";
pub(crate) const MODULE_BCOS: &str = "bcos";
#[cfg(feature = "debug-interface")]
pub(crate) const MODULE_DEBUG: &str = "debug";

/// Value width of an import parameter or result. The ABI carries no kind
/// distinction beyond width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValKind {
    I32,
    I64,
}

impl ValKind {
    pub fn to_val_type(self) -> ValType {
        match self {
            ValKind::I32 => ValType::I32,
            ValKind::I64 => ValType::I64,
        }
    }

    pub fn matches(self, ty: &ValType) -> bool {
        matches!(
            (self, ty),
            (ValKind::I32, ValType::I32) | (ValKind::I64, ValType::I64)
        )
    }
}

use ValKind::{I32, I64};

pub(crate) type Trampoline = fn(Caller<'_, HostState>, &[Val], &mut [Val]) -> Result<()>;

/// One registry entry: signature plus trampoline. Immutable after process
/// start.
pub(crate) struct ImportFunction {
    pub params: &'static [ValKind],
    pub results: &'static [ValKind],
    pub trampoline: Trampoline,
}

impl ImportFunction {
    pub fn func_type(&self, engine: &Engine) -> FuncType {
        FuncType::new(
            engine,
            self.params.iter().map(|k| k.to_val_type()),
            self.results.iter().map(|k| k.to_val_type()),
        )
    }
}

type Namespace = HashMap<&'static str, ImportFunction>;

static REGISTRY: Lazy<HashMap<&'static str, Namespace>> = Lazy::new(build_registry);

pub(crate) fn lookup(namespace: &str, name: &str) -> Option<&'static ImportFunction> {
    REGISTRY.get(namespace)?.get(name)
}

pub(crate) fn has_namespace(namespace: &str) -> bool {
    REGISTRY.contains_key(namespace)
}

// ----------------------------------------------------------------------
// Argument helpers
// ----------------------------------------------------------------------

fn arg_i32(args: &[Val], index: usize) -> Result<u32> {
    args.get(index)
        .and_then(|v| v.i32())
        .map(|v| v as u32)
        .ok_or_else(|| anyhow!("host function argument {index} is not an i32"))
}

fn arg_i64(args: &[Val], index: usize) -> Result<i64> {
    args.get(index)
        .and_then(|v| v.i64())
        .ok_or_else(|| anyhow!("host function argument {index} is not an i64"))
}

/// Run `f` with the invocation's interface and a fresh view of linear
/// memory. The view is re-derived on every host call; nothing survives a
/// `memory.grow` in between.
fn with_memory<R>(
    caller: &mut Caller<'_, HostState>,
    f: impl FnOnce(&mut HostInterface, &mut GuestMemory<'_>) -> Result<R>,
) -> Result<R> {
    let memory = caller
        .data()
        .memory
        .ok_or_else(|| anyhow!("no linear memory bound to this instance"))?;
    let (data, state) = memory.data_and_store_mut(caller.as_context_mut());
    let interface = state
        .interface
        .as_mut()
        .ok_or_else(|| anyhow!("no active invocation bound to this instance"))?;
    f(interface, &mut GuestMemory::new(data))
}

// ----------------------------------------------------------------------
// Trampolines
// ----------------------------------------------------------------------

fn use_gas(mut caller: Caller<'_, HostState>, args: &[Val], _results: &mut [Val]) -> Result<()> {
    let gas = arg_i64(args, 0)?;
    caller.data_mut().interface_mut()?.use_gas(gas)
}

fn get_gas_left(
    mut caller: Caller<'_, HostState>,
    _args: &[Val],
    results: &mut [Val],
) -> Result<()> {
    results[0] = Val::I64(caller.data_mut().interface_mut()?.gas_left());
    Ok(())
}

fn get_address(mut caller: Caller<'_, HostState>, args: &[Val], _results: &mut [Val]) -> Result<()> {
    let result_offset = arg_i32(args, 0)?;
    with_memory(&mut caller, |iface, mem| iface.get_address(mem, result_offset))
}

fn get_caller(mut caller: Caller<'_, HostState>, args: &[Val], _results: &mut [Val]) -> Result<()> {
    let result_offset = arg_i32(args, 0)?;
    with_memory(&mut caller, |iface, mem| iface.get_caller(mem, result_offset))
}

fn get_call_value(
    mut caller: Caller<'_, HostState>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<()> {
    let result_offset = arg_i32(args, 0)?;
    with_memory(&mut caller, |iface, mem| {
        iface.get_call_value(mem, result_offset)
    })
}

fn get_external_balance(
    mut caller: Caller<'_, HostState>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<()> {
    let address_offset = arg_i32(args, 0)?;
    let result_offset = arg_i32(args, 1)?;
    with_memory(&mut caller, |iface, mem| {
        iface.get_external_balance(mem, address_offset, result_offset)
    })
}

fn get_block_hash(
    mut caller: Caller<'_, HostState>,
    args: &[Val],
    results: &mut [Val],
) -> Result<()> {
    let number = arg_i64(args, 0)?;
    let result_offset = arg_i32(args, 1)?;
    let code = with_memory(&mut caller, |iface, mem| {
        iface.get_block_hash(mem, number, result_offset)
    })?;
    results[0] = Val::I32(code);
    Ok(())
}

fn get_call_data_size(
    mut caller: Caller<'_, HostState>,
    _args: &[Val],
    results: &mut [Val],
) -> Result<()> {
    results[0] = Val::I32(caller.data_mut().interface_mut()?.call_data_size());
    Ok(())
}

fn call_data_copy(
    mut caller: Caller<'_, HostState>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<()> {
    let result_offset = arg_i32(args, 0)?;
    let data_offset = arg_i32(args, 1)?;
    let length = arg_i32(args, 2)?;
    with_memory(&mut caller, |iface, mem| {
        iface.call_data_copy(mem, result_offset, data_offset, length)
    })
}

fn get_call_data(
    mut caller: Caller<'_, HostState>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<()> {
    let result_offset = arg_i32(args, 0)?;
    with_memory(&mut caller, |iface, mem| {
        iface.get_call_data(mem, result_offset)
    })
}

fn code_copy(mut caller: Caller<'_, HostState>, args: &[Val], _results: &mut [Val]) -> Result<()> {
    let result_offset = arg_i32(args, 0)?;
    let code_offset = arg_i32(args, 1)?;
    let length = arg_i32(args, 2)?;
    with_memory(&mut caller, |iface, mem| {
        iface.code_copy(mem, result_offset, code_offset, length)
    })
}

fn get_code_size(
    mut caller: Caller<'_, HostState>,
    _args: &[Val],
    results: &mut [Val],
) -> Result<()> {
    results[0] = Val::I32(caller.data_mut().interface_mut()?.code_size());
    Ok(())
}

fn external_code_copy(
    mut caller: Caller<'_, HostState>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<()> {
    let address_offset = arg_i32(args, 0)?;
    let result_offset = arg_i32(args, 1)?;
    let code_offset = arg_i32(args, 2)?;
    let length = arg_i32(args, 3)?;
    with_memory(&mut caller, |iface, mem| {
        iface.external_code_copy(mem, address_offset, result_offset, code_offset, length)
    })
}

fn get_external_code_size(
    mut caller: Caller<'_, HostState>,
    args: &[Val],
    results: &mut [Val],
) -> Result<()> {
    let address_offset = arg_i32(args, 0)?;
    let size = with_memory(&mut caller, |iface, mem| {
        iface.external_code_size(mem, address_offset)
    })?;
    results[0] = Val::I32(size);
    Ok(())
}

fn get_block_coinbase(
    mut caller: Caller<'_, HostState>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<()> {
    let result_offset = arg_i32(args, 0)?;
    with_memory(&mut caller, |iface, mem| {
        iface.get_block_coinbase(mem, result_offset)
    })
}

fn get_block_difficulty(
    mut caller: Caller<'_, HostState>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<()> {
    let result_offset = arg_i32(args, 0)?;
    with_memory(&mut caller, |iface, mem| {
        iface.get_block_difficulty(mem, result_offset)
    })
}

fn get_block_gas_limit(
    mut caller: Caller<'_, HostState>,
    _args: &[Val],
    results: &mut [Val],
) -> Result<()> {
    results[0] = Val::I64(caller.data_mut().interface_mut()?.block_gas_limit());
    Ok(())
}

fn get_tx_gas_price(
    mut caller: Caller<'_, HostState>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<()> {
    let value_offset = arg_i32(args, 0)?;
    with_memory(&mut caller, |iface, mem| {
        iface.get_tx_gas_price(mem, value_offset)
    })
}

fn log(mut caller: Caller<'_, HostState>, args: &[Val], _results: &mut [Val]) -> Result<()> {
    let data_offset = arg_i32(args, 0)?;
    let length = arg_i32(args, 1)?;
    let number_of_topics = arg_i32(args, 2)?;
    let topics = [
        arg_i32(args, 3)?,
        arg_i32(args, 4)?,
        arg_i32(args, 5)?,
        arg_i32(args, 6)?,
    ];
    with_memory(&mut caller, |iface, mem| {
        iface.log(mem, data_offset, length, number_of_topics, topics)
    })
}

fn get_block_number(
    mut caller: Caller<'_, HostState>,
    _args: &[Val],
    results: &mut [Val],
) -> Result<()> {
    results[0] = Val::I64(caller.data_mut().interface_mut()?.block_number());
    Ok(())
}

fn get_block_timestamp(
    mut caller: Caller<'_, HostState>,
    _args: &[Val],
    results: &mut [Val],
) -> Result<()> {
    results[0] = Val::I64(caller.data_mut().interface_mut()?.block_timestamp());
    Ok(())
}

fn get_tx_origin(
    mut caller: Caller<'_, HostState>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<()> {
    let result_offset = arg_i32(args, 0)?;
    with_memory(&mut caller, |iface, mem| {
        iface.get_tx_origin(mem, result_offset)
    })
}

fn storage_store(
    mut caller: Caller<'_, HostState>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<()> {
    let path_offset = arg_i32(args, 0)?;
    let value_offset = arg_i32(args, 1)?;
    with_memory(&mut caller, |iface, mem| {
        iface.storage_store(mem, path_offset, value_offset)
    })
}

fn storage_load(
    mut caller: Caller<'_, HostState>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<()> {
    let path_offset = arg_i32(args, 0)?;
    let result_offset = arg_i32(args, 1)?;
    with_memory(&mut caller, |iface, mem| {
        iface.storage_load(mem, path_offset, result_offset)
    })
}

fn set_storage(mut caller: Caller<'_, HostState>, args: &[Val], _results: &mut [Val]) -> Result<()> {
    let key_offset = arg_i32(args, 0)?;
    let key_length = arg_i32(args, 1)?;
    let value_offset = arg_i32(args, 2)?;
    let value_length = arg_i32(args, 3)?;
    with_memory(&mut caller, |iface, mem| {
        iface.set_storage(mem, key_offset, key_length, value_offset, value_length)
    })
}

fn get_storage(mut caller: Caller<'_, HostState>, args: &[Val], results: &mut [Val]) -> Result<()> {
    let key_offset = arg_i32(args, 0)?;
    let key_length = arg_i32(args, 1)?;
    let value_offset = arg_i32(args, 2)?;
    let written = with_memory(&mut caller, |iface, mem| {
        iface.get_storage(mem, key_offset, key_length, value_offset)
    })?;
    results[0] = Val::I32(written);
    Ok(())
}

fn finish(mut caller: Caller<'_, HostState>, args: &[Val], _results: &mut [Val]) -> Result<()> {
    let offset = arg_i32(args, 0)?;
    let size = arg_i32(args, 1)?;
    with_memory(&mut caller, |iface, mem| iface.finish(mem, offset, size))
}

fn revert(mut caller: Caller<'_, HostState>, args: &[Val], _results: &mut [Val]) -> Result<()> {
    let offset = arg_i32(args, 0)?;
    let size = arg_i32(args, 1)?;
    with_memory(&mut caller, |iface, mem| iface.revert(mem, offset, size))
}

fn get_return_data_size(
    mut caller: Caller<'_, HostState>,
    _args: &[Val],
    results: &mut [Val],
) -> Result<()> {
    results[0] = Val::I32(caller.data_mut().interface_mut()?.return_data_size());
    Ok(())
}

fn return_data_copy(
    mut caller: Caller<'_, HostState>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<()> {
    let result_offset = arg_i32(args, 0)?;
    let data_offset = arg_i32(args, 1)?;
    let size = arg_i32(args, 2)?;
    with_memory(&mut caller, |iface, mem| {
        iface.return_data_copy(mem, result_offset, data_offset, size)
    })
}

fn get_return_data(
    mut caller: Caller<'_, HostState>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<()> {
    let result_offset = arg_i32(args, 0)?;
    with_memory(&mut caller, |iface, mem| {
        iface.get_return_data(mem, result_offset)
    })
}

fn call(mut caller: Caller<'_, HostState>, args: &[Val], results: &mut [Val]) -> Result<()> {
    let address_offset = arg_i32(args, 0)?;
    let data_offset = arg_i32(args, 1)?;
    let data_length = arg_i32(args, 2)?;
    let code = with_memory(&mut caller, |iface, mem| {
        iface.call_contract(mem, address_offset, data_offset, data_length)
    })?;
    results[0] = Val::I32(code);
    Ok(())
}

fn create(mut caller: Caller<'_, HostState>, args: &[Val], results: &mut [Val]) -> Result<()> {
    let value_offset = arg_i32(args, 0)?;
    let data_offset = arg_i32(args, 1)?;
    let length = arg_i32(args, 2)?;
    let result_offset = arg_i32(args, 3)?;
    let code = with_memory(&mut caller, |iface, mem| {
        iface.create_contract(mem, value_offset, data_offset, length, result_offset)
    })?;
    results[0] = Val::I32(code);
    Ok(())
}

fn self_destruct(
    mut caller: Caller<'_, HostState>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<()> {
    let address_offset = arg_i32(args, 0)?;
    with_memory(&mut caller, |iface, mem| {
        iface.self_destruct(mem, address_offset)
    })
}

fn register_asset(
    mut caller: Caller<'_, HostState>,
    args: &[Val],
    results: &mut [Val],
) -> Result<()> {
    let name_offset = arg_i32(args, 0)?;
    let name_length = arg_i32(args, 1)?;
    let address_offset = arg_i32(args, 2)?;
    let fungible = arg_i32(args, 3)? as i32;
    let total = arg_i64(args, 4)?;
    let description_offset = arg_i32(args, 5)?;
    let description_length = arg_i32(args, 6)?;
    let code = with_memory(&mut caller, |iface, mem| {
        iface.register_asset(
            mem,
            name_offset,
            name_length,
            address_offset,
            fungible,
            total,
            description_offset,
            description_length,
        )
    })?;
    results[0] = Val::I32(code);
    Ok(())
}

fn issue_fungible_asset(
    mut caller: Caller<'_, HostState>,
    args: &[Val],
    results: &mut [Val],
) -> Result<()> {
    let address_offset = arg_i32(args, 0)?;
    let name_offset = arg_i32(args, 1)?;
    let name_length = arg_i32(args, 2)?;
    let amount = arg_i64(args, 3)?;
    let code = with_memory(&mut caller, |iface, mem| {
        iface.issue_fungible_asset(mem, address_offset, name_offset, name_length, amount)
    })?;
    results[0] = Val::I32(code);
    Ok(())
}

fn issue_not_fungible_asset(
    mut caller: Caller<'_, HostState>,
    args: &[Val],
    results: &mut [Val],
) -> Result<()> {
    let address_offset = arg_i32(args, 0)?;
    let name_offset = arg_i32(args, 1)?;
    let name_length = arg_i32(args, 2)?;
    let uri_offset = arg_i32(args, 3)?;
    let uri_length = arg_i32(args, 4)?;
    let id = with_memory(&mut caller, |iface, mem| {
        iface.issue_not_fungible_asset(
            mem,
            address_offset,
            name_offset,
            name_length,
            uri_offset,
            uri_length,
        )
    })?;
    results[0] = Val::I64(id);
    Ok(())
}

fn transfer_asset(
    mut caller: Caller<'_, HostState>,
    args: &[Val],
    results: &mut [Val],
) -> Result<()> {
    let address_offset = arg_i32(args, 0)?;
    let name_offset = arg_i32(args, 1)?;
    let name_length = arg_i32(args, 2)?;
    let amount_or_id = arg_i64(args, 3)?;
    let from_self = arg_i32(args, 4)? as i32;
    let code = with_memory(&mut caller, |iface, mem| {
        iface.transfer_asset(
            mem,
            address_offset,
            name_offset,
            name_length,
            amount_or_id,
            from_self,
        )
    })?;
    results[0] = Val::I32(code);
    Ok(())
}

fn get_asset_balance(
    mut caller: Caller<'_, HostState>,
    args: &[Val],
    results: &mut [Val],
) -> Result<()> {
    let address_offset = arg_i32(args, 0)?;
    let name_offset = arg_i32(args, 1)?;
    let name_length = arg_i32(args, 2)?;
    let balance = with_memory(&mut caller, |iface, mem| {
        iface.asset_balance(mem, address_offset, name_offset, name_length)
    })?;
    results[0] = Val::I64(balance);
    Ok(())
}

fn get_not_fungible_asset_ids(
    mut caller: Caller<'_, HostState>,
    args: &[Val],
    results: &mut [Val],
) -> Result<()> {
    let address_offset = arg_i32(args, 0)?;
    let name_offset = arg_i32(args, 1)?;
    let name_length = arg_i32(args, 2)?;
    let result_offset = arg_i32(args, 3)?;
    let result_length = arg_i32(args, 4)?;
    let count = with_memory(&mut caller, |iface, mem| {
        iface.not_fungible_asset_ids(
            mem,
            address_offset,
            name_offset,
            name_length,
            result_offset,
            result_length,
        )
    })?;
    results[0] = Val::I32(count);
    Ok(())
}

fn get_not_fungible_asset_info(
    mut caller: Caller<'_, HostState>,
    args: &[Val],
    results: &mut [Val],
) -> Result<()> {
    let address_offset = arg_i32(args, 0)?;
    let name_offset = arg_i32(args, 1)?;
    let name_length = arg_i32(args, 2)?;
    let asset_id = arg_i64(args, 3)?;
    let result_offset = arg_i32(args, 4)?;
    let result_length = arg_i32(args, 5)?;
    let code = with_memory(&mut caller, |iface, mem| {
        iface.not_fungible_asset_info(
            mem,
            address_offset,
            name_offset,
            name_length,
            asset_id,
            result_offset,
            result_length,
        )
    })?;
    results[0] = Val::I32(code);
    Ok(())
}

#[cfg(feature = "debug-interface")]
fn print32(_caller: Caller<'_, HostState>, args: &[Val], _results: &mut [Val]) -> Result<()> {
    let value = arg_i32(args, 0)?;
    tracing::debug!(target: "galena_vm::guest", "print32: {value} (0x{value:x})");
    Ok(())
}

#[cfg(feature = "debug-interface")]
fn print64(_caller: Caller<'_, HostState>, args: &[Val], _results: &mut [Val]) -> Result<()> {
    let value = arg_i64(args, 0)?;
    tracing::debug!(target: "galena_vm::guest", "print64: {value} (0x{value:x})");
    Ok(())
}

#[cfg(feature = "debug-interface")]
fn print_mem(mut caller: Caller<'_, HostState>, args: &[Val], _results: &mut [Val]) -> Result<()> {
    let offset = arg_i32(args, 0)?;
    let size = arg_i32(args, 1)?;
    with_memory(&mut caller, |iface, mem| {
        iface.debug_print_mem(mem, false, offset, size)
    })
}

#[cfg(feature = "debug-interface")]
fn print_mem_hex(
    mut caller: Caller<'_, HostState>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<()> {
    let offset = arg_i32(args, 0)?;
    let size = arg_i32(args, 1)?;
    with_memory(&mut caller, |iface, mem| {
        iface.debug_print_mem(mem, true, offset, size)
    })
}

#[cfg(feature = "debug-interface")]
fn print_storage(
    mut caller: Caller<'_, HostState>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<()> {
    let path_offset = arg_i32(args, 0)?;
    with_memory(&mut caller, |iface, mem| {
        iface.debug_print_storage(mem, false, path_offset)
    })
}

#[cfg(feature = "debug-interface")]
fn print_storage_hex(
    mut caller: Caller<'_, HostState>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<()> {
    let path_offset = arg_i32(args, 0)?;
    with_memory(&mut caller, |iface, mem| {
        iface.debug_print_storage(mem, true, path_offset)
    })
}

// ----------------------------------------------------------------------
// Registry construction
// ----------------------------------------------------------------------

fn entry(
    params: &'static [ValKind],
    results: &'static [ValKind],
    trampoline: Trampoline,
) -> ImportFunction {
    ImportFunction {
        params,
        results,
        trampoline,
    }
}

fn build_registry() -> HashMap<&'static str, Namespace> {
    let mut registry = HashMap::new();

    let mut ethereum = Namespace::new();
    ethereum.insert("useGas", entry(&[I64], &[], use_gas));
    ethereum.insert("getGasLeft", entry(&[], &[I64], get_gas_left));
    ethereum.insert("getAddress", entry(&[I32], &[], get_address));
    ethereum.insert("getExternalBalance", entry(&[I32, I32], &[], get_external_balance));
    ethereum.insert("getBlockHash", entry(&[I64, I32], &[I32], get_block_hash));
    ethereum.insert("getCallDataSize", entry(&[], &[I32], get_call_data_size));
    ethereum.insert("callDataCopy", entry(&[I32, I32, I32], &[], call_data_copy));
    ethereum.insert("getCaller", entry(&[I32], &[], get_caller));
    ethereum.insert("getCallValue", entry(&[I32], &[], get_call_value));
    ethereum.insert("codeCopy", entry(&[I32, I32, I32], &[], code_copy));
    ethereum.insert("getCodeSize", entry(&[], &[I32], get_code_size));
    ethereum.insert("externalCodeCopy", entry(&[I32, I32, I32, I32], &[], external_code_copy));
    ethereum.insert("getExternalCodeSize", entry(&[I32], &[I32], get_external_code_size));
    ethereum.insert("getBlockCoinbase", entry(&[I32], &[], get_block_coinbase));
    ethereum.insert("getBlockDifficulty", entry(&[I32], &[], get_block_difficulty));
    ethereum.insert("getBlockGasLimit", entry(&[], &[I64], get_block_gas_limit));
    ethereum.insert("getTxGasPrice", entry(&[I32], &[], get_tx_gas_price));
    ethereum.insert("log", entry(&[I32, I32, I32, I32, I32, I32, I32], &[], log));
    ethereum.insert("getBlockNumber", entry(&[], &[I64], get_block_number));
    ethereum.insert("getBlockTimestamp", entry(&[], &[I64], get_block_timestamp));
    ethereum.insert("getTxOrigin", entry(&[I32], &[], get_tx_origin));
    ethereum.insert("storageStore", entry(&[I32, I32], &[], storage_store));
    ethereum.insert("storageLoad", entry(&[I32, I32], &[], storage_load));
    ethereum.insert("finish", entry(&[I32, I32], &[], finish));
    ethereum.insert("revert", entry(&[I32, I32], &[], revert));
    ethereum.insert("getReturnDataSize", entry(&[], &[I32], get_return_data_size));
    ethereum.insert("returnDataCopy", entry(&[I32, I32, I32], &[], return_data_copy));
    ethereum.insert("create", entry(&[I32, I32, I32, I32], &[I32], create));
    ethereum.insert("selfDestruct", entry(&[I32], &[], self_destruct));
    registry.insert(MODULE_ETHEREUM, ethereum);

    let mut bcos = Namespace::new();
    bcos.insert("useGas", entry(&[I64], &[], use_gas));
    bcos.insert("finish", entry(&[I32, I32], &[], finish));
    bcos.insert("revert", entry(&[I32, I32], &[], revert));
    bcos.insert("getAddress", entry(&[I32], &[], get_address));
    bcos.insert("getCallDataSize", entry(&[], &[I32], get_call_data_size));
    bcos.insert("getCallData", entry(&[I32], &[], get_call_data));
    bcos.insert("create", entry(&[I32, I32, I32, I32], &[I32], create));
    bcos.insert("setStorage", entry(&[I32, I32, I32, I32], &[], set_storage));
    bcos.insert("getStorage", entry(&[I32, I32, I32], &[I32], get_storage));
    bcos.insert("getCaller", entry(&[I32], &[], get_caller));
    bcos.insert("getTxOrigin", entry(&[I32], &[], get_tx_origin));
    bcos.insert("getExternalCodeSize", entry(&[I32], &[I32], get_external_code_size));
    bcos.insert("getBlockNumber", entry(&[], &[I64], get_block_number));
    bcos.insert("getBlockTimestamp", entry(&[], &[I64], get_block_timestamp));
    bcos.insert("log", entry(&[I32, I32, I32, I32, I32, I32, I32], &[], log));
    bcos.insert("getReturnDataSize", entry(&[], &[I32], get_return_data_size));
    bcos.insert("getReturnData", entry(&[I32], &[], get_return_data));
    bcos.insert("call", entry(&[I32, I32, I32], &[I32], call));
    bcos.insert("registerAsset", entry(&[I32, I32, I32, I32, I64, I32, I32], &[I32], register_asset));
    bcos.insert("issueFungibleAsset", entry(&[I32, I32, I32, I64], &[I32], issue_fungible_asset));
    bcos.insert("issueNotFungibleAsset", entry(&[I32, I32, I32, I32, I32], &[I64], issue_not_fungible_asset));
    bcos.insert("transferAsset", entry(&[I32, I32, I32, I64, I32], &[I32], transfer_asset));
    bcos.insert("getAssetBalance", entry(&[I32, I32, I32], &[I64], get_asset_balance));
    bcos.insert("getNotFungibleAssetIDs", entry(&[I32, I32, I32, I32, I32], &[I32], get_not_fungible_asset_ids));
    bcos.insert("getNotFungibleAssetInfo", entry(&[I32, I32, I32, I64, I32, I32], &[I32], get_not_fungible_asset_info));
    registry.insert(MODULE_BCOS, bcos);

    #[cfg(feature = "debug-interface")]
    {
        let mut debug = Namespace::new();
        debug.insert("print32", entry(&[I32], &[], print32));
        debug.insert("print64", entry(&[I64], &[], print64));
        debug.insert("printMem", entry(&[I32, I32], &[], print_mem));
        debug.insert("printMemHex", entry(&[I32, I32], &[], print_mem_hex));
        debug.insert("printStorage", entry(&[I32], &[], print_storage));
        debug.insert("printStorageHex", entry(&[I32], &[], print_storage_hex));
        registry.insert(MODULE_DEBUG, debug);
    }

    registry
}
