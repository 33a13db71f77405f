//! Contract ABI validation.
//!
//! Runs on a compiled module's declared imports and exports before any
//! instantiation. A module accepted here never fails instantiation for ABI
//! reasons: the permitted import names and signatures are read from the
//! same registry the instance builder binds against.

use wasmtime::{Config, Engine, ExternType, FuncType, Module, ValType};

use crate::error::VmError;
use crate::imports::{self, ValKind};

/// Required export names.
pub(crate) const EXPORT_MEMORY: &str = "memory";
pub(crate) const EXPORT_DEPLOY: &str = "deploy";
pub(crate) const EXPORT_MAIN: &str = "main";
pub(crate) const EXPORT_HASH_TYPE: &str = "hash_type";

/// Linker-emitted globals a module may export alongside the ABI.
const EXPORT_DATA_END: &str = "__data_end";
const EXPORT_HEAP_BASE: &str = "__heap_base";

/// Compile `code` with a throwaway engine and validate the ABI.
pub(crate) fn validate_code(code: &[u8]) -> Result<(), VmError> {
    let engine = Engine::new(&Config::new())
        .map_err(|e| VmError::ContractValidation(format!("Failed to create engine: {e}")))?;
    let module = compile(&engine, code)?;
    validate_module(&module)
}

/// Compile `code`, mapping failure onto the fixed validation error.
pub(crate) fn compile(engine: &Engine, code: &[u8]) -> Result<Module, VmError> {
    Module::new(engine, code).map_err(|e| {
        tracing::debug!(error = %e, "wasm compilation failed");
        VmError::ContractValidation("Compile wasm failed".to_string())
    })
}

/// Enforce the module ABI on declared exports and imports.
pub(crate) fn validate_module(module: &Module) -> Result<(), VmError> {
    let mut seen_memory = false;
    let mut seen_deploy = false;
    let mut seen_main = false;
    let mut seen_hash_type = false;

    for export in module.exports() {
        match export.name() {
            EXPORT_MEMORY => {
                if !matches!(export.ty(), ExternType::Memory(_)) {
                    return Err(VmError::ContractValidation(
                        "\"memory\" is not pointing to memory.".to_string(),
                    ));
                }
                seen_memory = true;
            }
            EXPORT_DEPLOY | EXPORT_MAIN => {
                check_entry(&export.ty(), &[], &[])?;
                if export.name() == EXPORT_DEPLOY {
                    seen_deploy = true;
                } else {
                    seen_main = true;
                }
            }
            EXPORT_HASH_TYPE => {
                check_entry(&export.ty(), &[], &[ValKind::I32])?;
                seen_hash_type = true;
            }
            EXPORT_DATA_END | EXPORT_HEAP_BASE => {
                if !matches!(export.ty(), ExternType::Global(_)) {
                    return Err(VmError::ContractValidation(
                        "__data_end/__heap_base is not pointing to global.".to_string(),
                    ));
                }
            }
            other => {
                tracing::debug!(export = other, "rejecting module with stray export");
                return Err(VmError::ContractValidation(
                    "Invalid export is present.".to_string(),
                ));
            }
        }
    }

    if !(seen_memory && seen_deploy && seen_main && seen_hash_type) {
        return Err(VmError::ContractValidation(
            "BCI(deploy/main/hash_type/memory) are not all exported.".to_string(),
        ));
    }

    for import in module.imports() {
        let namespace = import.module();

        // The permitted namespaces are exactly the registry's; a module
        // accepted here can always be bound at instantiation.
        if !imports::has_namespace(namespace) {
            return Err(VmError::ContractValidation(
                "Import from invalid namespace.".to_string(),
            ));
        }

        let entry = imports::lookup(namespace, import.name()).ok_or_else(|| {
            VmError::ContractValidation(format!(
                "Importing invalid EEI method {}",
                import.name()
            ))
        })?;

        match import.ty() {
            ExternType::Func(declared) => {
                if !signature_matches(&declared, entry.params, entry.results) {
                    return Err(VmError::ContractValidation(
                        "Imported function type mismatch.".to_string(),
                    ));
                }
            }
            _ => {
                return Err(VmError::ContractValidation(
                    "Imported function type mismatch.".to_string(),
                ));
            }
        }
    }

    Ok(())
}

fn check_entry(ty: &ExternType, params: &[ValKind], results: &[ValKind]) -> Result<(), VmError> {
    let func = match ty {
        ExternType::Func(func) => func,
        _ => {
            return Err(VmError::ContractValidation(
                "\"main\" is not pointing to function.".to_string(),
            ))
        }
    };
    if !signature_matches(func, params, results) {
        return Err(VmError::ContractValidation(
            "deploy/main/hash_type have wrong signatures.".to_string(),
        ));
    }
    Ok(())
}

fn signature_matches(declared: &FuncType, params: &[ValKind], results: &[ValKind]) -> bool {
    let declared_params: Vec<ValType> = declared.params().collect();
    let declared_results: Vec<ValType> = declared.results().collect();

    declared_params.len() == params.len()
        && declared_results.len() == results.len()
        && params
            .iter()
            .zip(declared_params.iter())
            .all(|(kind, ty)| kind.matches(ty))
        && results
            .iter()
            .zip(declared_results.iter())
            .all(|(kind, ty)| kind.matches(ty))
}
