//! Per-invocation driver.
//!
//! `execute` acquires a pooled instance for the destination address, binds
//! a fresh [`HostInterface`] to it, runs `deploy` or `main`, and classifies
//! whatever trap unwinds the guest.

use std::sync::Arc;

use bytes::Bytes;

use crate::cache::{InstanceCache, InstanceState};
use crate::error::{classify_trap, Termination, VmError};
use crate::gas::GasSchedule;
use crate::host::{CallKind, HostContext, Message};
use crate::interface::HostInterface;
use crate::validator;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct VmConfig {
    /// Cap on pooled instances per contract address. Claims block once the
    /// cap is reached until an invocation releases.
    pub max_pool_instances: usize,
    /// Interface gas costs applied when an invocation meters host calls.
    pub schedule: GasSchedule,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            max_pool_instances: 10_000,
            schedule: GasSchedule::default(),
        }
    }
}

/// Result of one contract invocation.
#[derive(Debug, Clone, Default)]
pub struct ExecutionResult {
    /// Gas remaining; negative only when the run ended out of gas.
    pub gas_left: i64,
    /// Set when the guest terminated through `revert`.
    pub is_revert: bool,
    /// Guest payload; on a successful CREATE, the executed code bytes.
    pub return_value: Bytes,
}

/// The contract execution engine. One engine serves all addresses; it may
/// be driven from many threads at once.
#[derive(Default)]
pub struct WasmEngine {
    config: VmConfig,
    cache: InstanceCache,
}

impl WasmEngine {
    pub fn new(config: VmConfig) -> Self {
        Self {
            config,
            cache: InstanceCache::default(),
        }
    }

    /// Check a module against the contract ABI without instantiating it.
    pub fn validate(&self, code: &[u8]) -> Result<(), VmError> {
        validator::validate_code(code)
    }

    /// Run one invocation to completion.
    ///
    /// `code` is the module to execute and the CREATE return payload;
    /// `account_code` backs `codeCopy`/`getCodeSize`. With `meter_gas` set,
    /// host calls charge the configured interface schedule on top of the
    /// guest's own `useGas` instrumentation.
    pub fn execute(
        &self,
        host: Arc<dyn HostContext>,
        code: &[u8],
        account_code: Bytes,
        msg: Message,
        meter_gas: bool,
    ) -> Result<ExecutionResult, VmError> {
        let kind = msg.kind;
        let destination = msg.destination;
        tracing::debug!(%destination, ?kind, gas = msg.gas, "executing contract");

        let container = self
            .cache
            .get_or_create(destination, code, self.config.max_pool_instances)?;
        let claim = container.claim()?;
        let mut state = claim.state();

        let interface = HostInterface::new(
            host.clone(),
            account_code,
            msg,
            meter_gas,
            self.config.schedule,
        );
        state.store.data_mut().interface = Some(interface);

        let dispatched = dispatch(&mut state, kind, host.as_ref());

        // The interface must leave the pooled store on every path; it holds
        // the invocation's host context and result.
        let interface = state.store.data_mut().interface.take();
        drop(state);
        drop(claim);

        let interface =
            interface.ok_or_else(|| VmError::Unknown("invocation state lost".to_string()))?;
        let mut result = interface.into_result();

        match dispatched? {
            Ok(()) => {}
            Err(trap) => match classify_trap(&trap) {
                Termination::Finish => result.is_revert = false,
                Termination::Revert => result.is_revert = true,
                Termination::Fail(err) => {
                    if matches!(err, VmError::Unknown(_)) {
                        tracing::warn!(trap = %trap, "unclassified trap from runtime");
                    } else {
                        tracing::debug!(trap = %trap, error = %err, "guest trapped");
                    }
                    return Err(err);
                }
            },
        }

        if kind == CallKind::Create && !result.is_revert {
            result.return_value = Bytes::copy_from_slice(code);
        }

        tracing::debug!(
            gas_left = result.gas_left,
            is_revert = result.is_revert,
            output_len = result.return_value.len(),
            "execution finished"
        );
        Ok(result)
    }
}

/// Run the hash-algorithm handshake (CREATE only) and the chosen entry.
/// The outer error is a validation failure raised before the entry ran; the
/// inner result is the entry call itself.
fn dispatch(
    state: &mut InstanceState,
    kind: CallKind,
    host: &dyn HostContext,
) -> Result<Result<(), wasmtime::Error>, VmError> {
    if kind == CallKind::Create {
        // 0 = keccak256, 1 = sm3.
        let expected = i32::from(host.sm3_hash());
        let declared = match state.hash_type.call(&mut state.store, ()) {
            Ok(declared) => declared,
            Err(trap) => {
                return Err(VmError::ContractValidation(format!(
                    "call hash_type failed, {trap}"
                )))
            }
        };
        tracing::debug!(declared, expected, "hash algorithm handshake");
        if declared != expected {
            return Err(VmError::ContractValidation("hash type mismatch".to_string()));
        }
        Ok(state.deploy.call(&mut state.store, ()))
    } else {
        Ok(state.main.call(&mut state.store, ()))
    }
}
