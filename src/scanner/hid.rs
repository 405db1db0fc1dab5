//! USB HID boot-keyboard reports, as sent by barcode scanners in keyboard
//! mode: byte 0 holds the modifier bits, byte 2 the first pressed keycode.

const LEFT_SHIFT: u8 = 0x02;
const RIGHT_SHIFT: u8 = 0x20;
const ENTER: u8 = 40;

/// Decodes one report into the typed character, if any.
pub fn decode_report(report: &[u8]) -> Option<char> {
    if report.len() < 3 || report[2] == 0 {
        return None;
    }
    let shift = matches!(report[0], LEFT_SHIFT | RIGHT_SHIFT);
    decode_key(report[2], shift)
}

fn decode_key(code: u8, shift: bool) -> Option<char> {
    match code {
        // a..z
        4..=29 => {
            let c = (b'a' + code - 4) as char;
            Some(if shift { c.to_ascii_uppercase() } else { c })
        }
        // 1..9, 0
        30..=39 => {
            let digit = if code == 39 { b'0' } else { b'1' + code - 30 };
            if shift {
                b"!@#$%^&*()".get(usize::from(code - 30)).map(|b| *b as char)
            } else {
                Some(digit as char)
            }
        }
        ENTER if !shift => Some('\n'),
        44 if !shift => Some(' '),
        45 => Some(if shift { '_' } else { '-' }),
        46 => Some(if shift { '+' } else { '=' }),
        47 => Some(if shift { '{' } else { '[' }),
        48 => Some(if shift { '}' } else { ']' }),
        49 => Some(if shift { '|' } else { '\\' }),
        51 => Some(if shift { ':' } else { ';' }),
        52 => Some(if shift { '"' } else { '\'' }),
        53 => Some(if shift { '~' } else { '`' }),
        54 => Some(if shift { '<' } else { ',' }),
        55 => Some(if shift { '>' } else { '.' }),
        56 => Some(if shift { '?' } else { '/' }),
        _ => None,
    }
}

/// Accumulates decoded characters until Enter completes a barcode.
#[derive(Debug, Default)]
pub struct BarcodeAssembler {
    pending: String,
}

impl BarcodeAssembler {
    pub fn push_report(&mut self, report: &[u8]) -> Option<String> {
        match decode_report(report)? {
            '\n' => self.flush(),
            c => {
                self.pending.push(c);
                None
            }
        }
    }

    /// Hands out a partial barcode, e.g. after the scanner went quiet
    /// without sending Enter.
    pub fn flush(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }
}
