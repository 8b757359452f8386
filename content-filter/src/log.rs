//! 浏览器控制台日志；非 wasm 目标下静默

/// 输出一行日志到浏览器控制台
pub fn write(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::log_1(&wasm_bindgen::JsValue::from_str(message));

    #[cfg(not(target_arch = "wasm32"))]
    let _ = message;
}

/// 输出一行警告到浏览器控制台
pub fn warn(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&wasm_bindgen::JsValue::from_str(message));

    #[cfg(not(target_arch = "wasm32"))]
    let _ = message;
}

/// `format!` 风格的控制台日志
#[macro_export]
macro_rules! console_log {
    ($($arg:tt)*) => {
        $crate::log::write(&format!($($arg)*))
    };
}

/// `format!` 风格的控制台警告
#[macro_export]
macro_rules! console_warn {
    ($($arg:tt)*) => {
        $crate::log::warn(&format!($($arg)*))
    };
}
