//! Compiled-module and instance caching.
//!
//! Instantiating a module is expensive: imports must be bound, linear
//! memory allocated, the start section run. The cache keeps one
//! [`ModuleContainer`] per contract address, each owning its compiled
//! module and a pool of reusable instances. Pooled instances keep whatever
//! linear memory the previous run left behind; contracts are expected to
//! self-initialise in `deploy`/`main`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use galena_types::Address;
use parking_lot::{Condvar, Mutex, MutexGuard, RwLock};
use wasmtime::{Config, Engine, Extern, Func, Instance, Module, OptLevel, Store, TypedFunc};

use crate::error::VmError;
use crate::imports;
use crate::interface::HostState;
use crate::validator::{self, EXPORT_DEPLOY, EXPORT_HASH_TYPE, EXPORT_MAIN, EXPORT_MEMORY};

/// Everything needed to run one claimed instance. The linear-memory handle
/// lives in the store data, where trampolines re-derive their view from it
/// on every host call.
pub(crate) struct InstanceState {
    pub store: Store<HostState>,
    pub hash_type: TypedFunc<(), i32>,
    pub deploy: TypedFunc<(), ()>,
    pub main: TypedFunc<(), ()>,
}

/// A pooled instance. `idle == true` means free for claim; the state mutex
/// is uncontended once a claimer has won the idle flag.
pub(crate) struct CachedInstance {
    idle: AtomicBool,
    state: Mutex<InstanceState>,
}

/// Compiled module plus its instance pool, keyed by contract address.
pub(crate) struct ModuleContainer {
    engine: Engine,
    module: Module,
    instances: RwLock<Vec<Arc<CachedInstance>>>,
    max_instances: usize,
    /// Pairs with `released` to park claimers once the pool is at capacity.
    release_lock: Mutex<()>,
    released: Condvar,
}

impl ModuleContainer {
    /// Validate and compile `code`, producing an empty container. The first
    /// claim populates the pool.
    pub fn build(code: &[u8], max_instances: usize) -> Result<Self, VmError> {
        let mut config = Config::new();
        config
            .wasm_bulk_memory(true)
            .wasm_multi_value(true)
            .wasm_reference_types(true)
            .cranelift_opt_level(OptLevel::Speed);
        let engine = Engine::new(&config)
            .map_err(|e| VmError::ContractValidation(format!("Failed to create engine: {e}")))?;

        let module = validator::compile(&engine, code)?;
        validator::validate_module(&module)?;

        Ok(Self {
            engine,
            module,
            instances: RwLock::new(Vec::new()),
            max_instances,
            release_lock: Mutex::new(()),
            released: Condvar::new(),
        })
    }

    /// Claim an idle instance, growing the pool when none is free. Blocks
    /// once the pool is at capacity until another invocation releases.
    pub fn claim(self: &Arc<Self>) -> Result<InstanceClaim, VmError> {
        loop {
            if let Some(instance) = self.try_claim_idle() {
                return Ok(InstanceClaim {
                    container: self.clone(),
                    instance,
                });
            }

            {
                let mut pool = self.instances.write();
                if pool.len() < self.max_instances {
                    let instance = Arc::new(self.new_instance()?);
                    pool.push(instance.clone());
                    return Ok(InstanceClaim {
                        container: self.clone(),
                        instance,
                    });
                }
            }

            // Pool is at capacity. Re-check under the release lock so a
            // release between our scan and the wait cannot be missed.
            let mut parked = self.release_lock.lock();
            if self.try_claim_idle().is_none() {
                self.released.wait(&mut parked);
            }
        }
    }

    /// Scan the pool and try to win an idle instance. The swap is the
    /// compare-and-exchange that tolerates racing claimers on one slot.
    fn try_claim_idle(&self) -> Option<Arc<CachedInstance>> {
        let pool = self.instances.read();
        for instance in pool.iter() {
            if instance.idle.swap(false, Ordering::AcqRel) {
                return Some(instance.clone());
            }
        }
        None
    }

    /// Bind imports in declaration order and resolve the ABI exports.
    fn new_instance(&self) -> Result<CachedInstance, VmError> {
        let mut store = Store::new(&self.engine, HostState::default());

        let mut externs: Vec<Extern> = Vec::new();
        for import in self.module.imports() {
            let entry = imports::lookup(import.module(), import.name()).ok_or_else(|| {
                VmError::ContractValidation(format!(
                    "{} is not a supported function",
                    import.name()
                ))
            })?;
            let ty = entry.func_type(&self.engine);
            externs.push(Func::new(&mut store, ty, entry.trampoline).into());
        }

        let instance = Instance::new(&mut store, &self.module, &externs).map_err(|e| {
            tracing::debug!(error = %e, "instantiation failed");
            VmError::ContractValidation("Error instantiating wasm".to_string())
        })?;

        let memory = instance
            .get_memory(&mut store, EXPORT_MEMORY)
            .ok_or(VmError::InvalidMemoryAccess)?;
        if memory.size(&store) < 1 {
            tracing::debug!("module exported a zero-page memory");
            return Err(VmError::InvalidMemoryAccess);
        }
        store.data_mut().memory = Some(memory);

        let hash_type = typed_export(&instance, &mut store, EXPORT_HASH_TYPE)?;
        let deploy = typed_export(&instance, &mut store, EXPORT_DEPLOY)?;
        let main = typed_export(&instance, &mut store, EXPORT_MAIN)?;

        Ok(CachedInstance {
            // Born claimed; the creating invocation uses it directly.
            idle: AtomicBool::new(false),
            state: Mutex::new(InstanceState {
                store,
                hash_type,
                deploy,
                main,
            }),
        })
    }

    #[cfg(test)]
    pub fn pool_size(&self) -> usize {
        self.instances.read().len()
    }

    #[cfg(test)]
    pub fn idle_count(&self) -> usize {
        self.instances
            .read()
            .iter()
            .filter(|i| i.idle.load(Ordering::Acquire))
            .count()
    }
}

fn typed_export<P, R>(
    instance: &Instance,
    store: &mut Store<HostState>,
    name: &str,
) -> Result<TypedFunc<P, R>, VmError>
where
    P: wasmtime::WasmParams,
    R: wasmtime::WasmResults,
{
    instance
        .get_typed_func::<P, R>(&mut *store, name)
        .map_err(|e| {
            tracing::debug!(error = %e, export = name, "entry resolution failed");
            VmError::ContractValidation(format!("can't find {name}"))
        })
}

/// Scoped exclusive use of one pooled instance. Dropping the claim flips
/// the idle flag back and wakes one parked claimer, on every exit path.
pub(crate) struct InstanceClaim {
    container: Arc<ModuleContainer>,
    instance: Arc<CachedInstance>,
}

impl InstanceClaim {
    pub fn state(&self) -> MutexGuard<'_, InstanceState> {
        self.instance.state.lock()
    }
}

impl Drop for InstanceClaim {
    fn drop(&mut self) {
        self.instance.idle.store(true, Ordering::Release);
        drop(self.container.release_lock.lock());
        self.container.released.notify_one();
    }
}

/// Process-wide address table. Lookups take the shared lock, insertions the
/// exclusive one; compilation of a new contract happens under the exclusive
/// lock on first miss.
#[derive(Default)]
pub(crate) struct InstanceCache {
    containers: RwLock<HashMap<Address, Arc<ModuleContainer>>>,
}

impl InstanceCache {
    pub fn get_or_create(
        &self,
        address: Address,
        code: &[u8],
        max_instances: usize,
    ) -> Result<Arc<ModuleContainer>, VmError> {
        if let Some(container) = self.containers.read().get(&address) {
            return Ok(container.clone());
        }

        let mut table = self.containers.write();
        if let Some(container) = table.get(&address) {
            return Ok(container.clone());
        }
        let container = Arc::new(ModuleContainer::build(code, max_instances)?);
        table.insert(address, container.clone());
        Ok(container)
    }
}
