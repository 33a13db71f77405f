/// Gas costs charged by the host interface when interface metering is
/// enabled for an invocation. Instrumented contracts meter themselves
/// through `useGas`, so the schedule only covers the environment calls.
#[derive(Debug, Clone, Copy)]
pub struct GasSchedule {
    // Storage
    pub storage_load: u64,      // 200
    pub storage_store: u64,     // 5,000

    // Account queries
    pub balance: u64,           // 400
    pub external_code: u64,     // 700

    // Events
    pub log_base: u64,          // 375
    pub log_per_topic: u64,     // 375
    pub log_per_byte: u64,      // 8

    // Data movement across the sandbox boundary
    pub copy_per_word: u64,     // 3  (per 32-byte word)

    // Calls & creation
    pub call_base: u64,         // 700
    pub create_base: u64,       // 32,000
    pub self_destruct: u64,     // 5,000

    // Asset operations
    pub asset_op: u64,          // 2,000
}

impl Default for GasSchedule {
    fn default() -> Self {
        Self {
            storage_load: 200,
            storage_store: 5_000,

            balance: 400,
            external_code: 700,

            log_base: 375,
            log_per_topic: 375,
            log_per_byte: 8,

            copy_per_word: 3,

            call_base: 700,
            create_base: 32_000,
            self_destruct: 5_000,

            asset_op: 2_000,
        }
    }
}

impl GasSchedule {
    /// Cost of moving `len` bytes between guest memory and the host.
    pub fn copy_cost(&self, len: u32) -> u64 {
        (u64::from(len)).div_ceil(32) * self.copy_per_word
    }
}
