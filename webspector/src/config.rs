// --- Input Config ---
pub const MODE_COUNT: u8 = 4; // Display modes cycled by the mode button (GPIO15)
pub const BUTTON_DEBOUNCE_MS: u64 = 30;

// --- Report Config ---
pub const REPORT_EVERY_FRAMES: u32 = 40; // About one report per second at 40 kHz / 1024
