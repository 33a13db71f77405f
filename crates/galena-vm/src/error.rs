use thiserror::Error;

/// Errors surfaced by one contract invocation. All variants are fatal for
/// the invocation and are never retried by the engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum VmError {
    /// The module failed to compile, violated the contract ABI, or the
    /// hash-algorithm handshake did not match the host.
    #[error("contract validation failed: {0}")]
    ContractValidation(String),

    /// A guest-supplied offset/length pair fell outside linear memory, or
    /// the module exported a zero-page memory.
    #[error("invalid memory access")]
    InvalidMemoryAccess,

    #[error("Out of gas.")]
    OutOfGas,

    /// The guest hit an `unreachable` instruction or exhausted the value
    /// stack.
    #[error("unreachable instruction executed")]
    Unreachable,

    /// The runtime surfaced a trap the engine does not recognise.
    #[error("Unknown error.")]
    Unknown(String),
}

/// Typed termination sentinel raised by host functions. Carried through the
/// runtime as the trap cause and recovered by downcast when the guest call
/// unwinds. The display strings double as the legacy trap-message protocol.
#[derive(Debug, Error)]
pub(crate) enum HostTrap {
    #[error("finish")]
    Finish,

    #[error("revert")]
    Revert,

    #[error("Out of gas.")]
    OutOfGas,

    #[error("memory access out of bounds")]
    MemoryAccess,
}

/// How a trapped guest call is resolved: the two cooperative unwinds are
/// successful terminations, everything else maps onto a [`VmError`].
#[derive(Debug)]
pub(crate) enum Termination {
    Finish,
    Revert,
    Fail(VmError),
}

/// Classify the error returned from a guest entry call. Typed causes are
/// preferred; the trap-message substring protocol is kept as a fallback for
/// errors that only carry a rendered string.
pub(crate) fn classify_trap(err: &wasmtime::Error) -> Termination {
    if let Some(host) = err.downcast_ref::<HostTrap>() {
        return match host {
            HostTrap::Finish => Termination::Finish,
            HostTrap::Revert => Termination::Revert,
            HostTrap::OutOfGas => Termination::Fail(VmError::OutOfGas),
            HostTrap::MemoryAccess => Termination::Fail(VmError::InvalidMemoryAccess),
        };
    }

    if let Some(trap) = err.downcast_ref::<wasmtime::Trap>() {
        match trap {
            wasmtime::Trap::UnreachableCodeReached => {
                return Termination::Fail(VmError::Unreachable)
            }
            // Stack exhaustion is reported the same way the guest's own
            // `unreachable` is.
            wasmtime::Trap::StackOverflow => return Termination::Fail(VmError::Unreachable),
            wasmtime::Trap::MemoryOutOfBounds => {
                return Termination::Fail(VmError::InvalidMemoryAccess)
            }
            _ => {}
        }
    }

    classify_message(&format!("{err:#}"))
}

/// Legacy trap-message protocol: case-sensitive substring match, evaluated
/// in a fixed order, first hit wins.
pub(crate) fn classify_message(message: &str) -> Termination {
    if message.contains("Out of gas.") {
        Termination::Fail(VmError::OutOfGas)
    } else if message.contains("unreachable") {
        Termination::Fail(VmError::Unreachable)
    } else if message.contains("stack exhausted") {
        Termination::Fail(VmError::Unreachable)
    } else if message.contains("revert") {
        Termination::Revert
    } else if message.contains("finish") {
        Termination::Finish
    } else if message.contains("memory access") {
        Termination::Fail(VmError::InvalidMemoryAccess)
    } else {
        Termination::Fail(VmError::Unknown(message.to_string()))
    }
}
