//! The debug-utils messenger callback.
//!
//! The driver may call in from any thread, during and after instance
//! creation. Nothing here touches shared state or allocates.
use ash::vk;
use std::{
    ffi::{c_void, CStr},
    fmt,
    io::{self, Write},
};

const SEVERITY_TAGS: [(vk::DebugUtilsMessageSeverityFlagsEXT, &str); 4] = [
    (vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE, "VERBOSE"),
    (vk::DebugUtilsMessageSeverityFlagsEXT::INFO, "INFO"),
    (vk::DebugUtilsMessageSeverityFlagsEXT::WARNING, "WARNING"),
    (vk::DebugUtilsMessageSeverityFlagsEXT::ERROR, "ERROR"),
];

const TYPE_TAGS: [(vk::DebugUtilsMessageTypeFlagsEXT, &str); 4] = [
    (vk::DebugUtilsMessageTypeFlagsEXT::GENERAL, "GENERAL"),
    (vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION, "VALIDATION"),
    (vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE, "PERFORMANCE"),
    (
        vk::DebugUtilsMessageTypeFlagsEXT::DEVICE_ADDRESS_BINDING,
        "DEVICE_ADDRESS_BINDING",
    ),
];

/// Every severity the messenger can report.
pub fn all_severities() -> vk::DebugUtilsMessageSeverityFlagsEXT {
    SEVERITY_TAGS
        .iter()
        .fold(vk::DebugUtilsMessageSeverityFlagsEXT::empty(), |acc, (flag, _)| acc | *flag)
}

/// Every message type the messenger can report.
pub fn all_message_types() -> vk::DebugUtilsMessageTypeFlagsEXT {
    TYPE_TAGS
        .iter()
        .fold(vk::DebugUtilsMessageTypeFlagsEXT::empty(), |acc, (flag, _)| acc | *flag)
}

/// Renders `[SEVERITY][TYPE...]`, severity tags first, each group in its
/// fixed order regardless of bit order. Unknown bits are ignored.
#[derive(Debug, Copy, Clone)]
pub struct MessageTags {
    severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    types: vk::DebugUtilsMessageTypeFlagsEXT,
}

impl MessageTags {
    /// Tags for one message.
    #[inline]
    pub fn new(
        severity: vk::DebugUtilsMessageSeverityFlagsEXT,
        types: vk::DebugUtilsMessageTypeFlagsEXT,
    ) -> MessageTags {
        MessageTags { severity, types }
    }
}

impl fmt::Display for MessageTags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, tag) in SEVERITY_TAGS {
            if self.severity.contains(flag) {
                write!(f, "[{tag}]")?;
            }
        }

        for (flag, tag) in TYPE_TAGS {
            if self.types.contains(flag) {
                write!(f, "[{tag}]")?;
            }
        }

        Ok(())
    }
}

/// Write one diagnostic line: tags, a space, the raw message bytes.
pub fn write_diagnostic<W: Write>(
    out: &mut W,
    severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    types: vk::DebugUtilsMessageTypeFlagsEXT,
    message: &[u8],
) -> io::Result<()> {
    write!(out, "{} ", MessageTags::new(severity, types))?;
    out.write_all(message)?;
    out.write_all(b"\n")
}

/// Longest line the callback emits with a single write.
const LINE_CAPACITY: usize = 2048;

/// Render one diagnostic line into `buf`. Returns the line length, or `None`
/// if it does not fit.
pub fn format_diagnostic(
    buf: &mut [u8],
    severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    types: vk::DebugUtilsMessageTypeFlagsEXT,
    message: &[u8],
) -> Option<usize> {
    let mut cursor = io::Cursor::new(buf);
    write_diagnostic(&mut cursor, severity, types, message).ok()?;
    Some(cursor.position() as usize)
}

/// Messenger callback printing every message to stdout.
///
/// Lines up to 2048 bytes are rendered on the stack and handed
/// to stdout in one `write_all`, so the stdout lock is held for that write
/// only; longer lines take the lock for the three writes of
/// [`write_diagnostic`]. Stdout's buffer is allocated on its first use, which
/// the report does before any instance exists.
///
/// Always returns `VK_FALSE` so the call that triggered the message is not
/// aborted.
pub unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _p_user_data: *mut c_void,
) -> vk::Bool32 {
    let message: &[u8] = match p_callback_data.as_ref() {
        Some(data) if !data.p_message.is_null() => CStr::from_ptr(data.p_message).to_bytes(),
        _ => b"",
    };

    let mut line = [0u8; LINE_CAPACITY];
    let mut stdout = io::stdout();
    // Nowhere to report a broken stdout from inside the driver.
    let _ = match format_diagnostic(&mut line, message_severity, message_type, message) {
        Some(len) => stdout.write_all(&line[..len]),
        None => write_diagnostic(&mut stdout.lock(), message_severity, message_type, message),
    };

    vk::FALSE
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{ptr, sync::mpsc, thread, time::Duration};

    type Severity = vk::DebugUtilsMessageSeverityFlagsEXT;
    type Type = vk::DebugUtilsMessageTypeFlagsEXT;

    #[test]
    fn warning_validation_performance() {
        let tags = MessageTags::new(Severity::WARNING, Type::PERFORMANCE | Type::VALIDATION);
        assert_eq!(tags.to_string(), "[WARNING][VALIDATION][PERFORMANCE]");
    }

    #[test]
    fn type_tags_follow_fixed_order() {
        let tags = MessageTags::new(Severity::ERROR, all_message_types());
        assert_eq!(
            tags.to_string(),
            "[ERROR][GENERAL][VALIDATION][PERFORMANCE][DEVICE_ADDRESS_BINDING]"
        );

        let tags = MessageTags::new(Severity::VERBOSE, Type::DEVICE_ADDRESS_BINDING);
        assert_eq!(tags.to_string(), "[VERBOSE][DEVICE_ADDRESS_BINDING]");
    }

    #[test]
    fn unknown_bits_are_ignored() {
        let tags = MessageTags::new(
            Severity::from_raw(Severity::INFO.as_raw() | 0x8000_0000),
            Type::from_raw(0x4000_0000),
        );
        assert_eq!(tags.to_string(), "[INFO]");
    }

    #[test]
    fn diagnostic_line() {
        let mut out = Vec::new();
        write_diagnostic(&mut out, Severity::INFO, Type::GENERAL, b"loader message").unwrap();
        assert_eq!(out, b"[INFO][GENERAL] loader message\n");
    }

    #[test]
    fn line_fits_on_the_stack() {
        let mut buf = [0u8; 64];
        let len = format_diagnostic(&mut buf, Severity::WARNING, Type::VALIDATION, b"hi").unwrap();
        assert_eq!(&buf[..len], b"[WARNING][VALIDATION] hi\n");

        let mut small = [0u8; 8];
        assert_eq!(
            format_diagnostic(&mut small, Severity::WARNING, Type::VALIDATION, b"hi"),
            None
        );
    }

    #[test]
    fn callback_does_not_wait_for_a_held_report_writer() {
        // The report holds an unlocked handle; the callback only contends
        // for its own write.
        let mut report = io::stdout();
        report.write_all(b"").unwrap();

        let (done, finished) = mpsc::channel();
        let driver = thread::spawn(move || {
            let message = b"from a driver thread\0";
            let data = vk::DebugUtilsMessengerCallbackDataEXT {
                p_message: message.as_ptr().cast(),
                ..Default::default()
            };
            let result = unsafe {
                debug_callback(Severity::INFO, Type::GENERAL, &data, ptr::null_mut())
            };
            done.send(result).unwrap();
        });

        let result = finished.recv_timeout(Duration::from_secs(5));
        report.write_all(b"").unwrap();
        assert_eq!(result, Ok(vk::FALSE));
        driver.join().unwrap();

        let mut message = vec![b'x'; LINE_CAPACITY * 2];
        message.push(0);
        let data = vk::DebugUtilsMessengerCallbackDataEXT {
            p_message: message.as_ptr().cast(),
            ..Default::default()
        };
        let result = unsafe { debug_callback(Severity::INFO, Type::GENERAL, &data, ptr::null_mut()) };
        assert_eq!(result, vk::FALSE);
    }

    #[test]
    fn full_filters() {
        assert_eq!(
            all_severities(),
            Severity::VERBOSE | Severity::INFO | Severity::WARNING | Severity::ERROR
        );
        assert!(all_message_types().contains(Type::DEVICE_ADDRESS_BINDING));
    }

    #[test]
    fn callback_never_aborts() {
        let message = b"validation says hi\0";
        let data = vk::DebugUtilsMessengerCallbackDataEXT {
            p_message: message.as_ptr().cast(),
            ..Default::default()
        };

        let result = unsafe {
            debug_callback(Severity::ERROR, Type::VALIDATION, &data, ptr::null_mut())
        };
        assert_eq!(result, vk::FALSE);

        let result = unsafe {
            debug_callback(Severity::INFO, Type::GENERAL, ptr::null(), ptr::null_mut())
        };
        assert_eq!(result, vk::FALSE);
    }
}
