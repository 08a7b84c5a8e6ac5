use super::{Opcode, RecordType, ResponseCode};
use std::fmt::Write;

/// Renders a raw packet field by field with byte offsets.
///
/// Best effort: stops at the first field that runs past the end of the buffer
/// and reports any bytes left after the last section. Never panics.
pub fn dump_packet(buf: &[u8]) -> String {
    let mut dumper = Dumper {
        buf,
        pos: 0,
        out: String::new(),
    };
    if dumper.packet().is_none() {
        let _ = writeln!(
            dumper.out,
            "TRUNCATED: packet ends at offset {} ({} bytes)",
            dumper.pos,
            buf.len()
        );
    } else if dumper.pos < buf.len() {
        let _ = writeln!(
            dumper.out,
            "{}: {} trailing bytes not decoded",
            dumper.pos,
            buf.len() - dumper.pos
        );
    }
    dumper.out
}

struct Dumper<'a> {
    buf: &'a [u8],
    pos: usize,
    out: String,
}

impl Dumper<'_> {
    fn u8(&mut self) -> Option<u8> {
        let value = *self.buf.get(self.pos)?;
        self.pos += 1;
        Some(value)
    }

    fn u16(&mut self) -> Option<u16> {
        let bytes = self.buf.get(self.pos..self.pos + 2)?;
        self.pos += 2;
        Some(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn u32(&mut self) -> Option<u32> {
        let bytes = self.buf.get(self.pos..self.pos + 4)?;
        self.pos += 4;
        Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn text(&mut self, len: usize) -> Option<String> {
        let bytes = self.buf.get(self.pos..self.pos + len)?;
        self.pos += len;
        Some(String::from_utf8_lossy(bytes).into_owned())
    }

    fn line(&mut self, text: std::fmt::Arguments<'_>) {
        let _ = writeln!(self.out, "{}", text);
    }

    fn packet(&mut self) -> Option<()> {
        self.line(format_args!("HEADER:"));
        let at = self.pos;
        let id = self.u16()?;
        self.line(format_args!("{}: ID: {}", at, id));

        let at = self.pos;
        let flags = self.u16()?;
        let mut text = format!("{}: FLAGS: ({:016b})", at, flags);
        if flags & 0x8000 != 0 {
            text.push_str(" QR");
        }
        let opcode = ((flags >> 11) & 0x0F) as u8;
        match Opcode::from_u8(opcode) {
            Some(op) => {
                let _ = write!(text, " {}", op.as_str());
            }
            None => {
                let _ = write!(text, " OPCODE={}?", opcode);
            }
        }
        for (bit, name) in [(10, "AA"), (9, "TC"), (8, "RD"), (7, "RA")] {
            if flags & (1 << bit) != 0 {
                let _ = write!(text, " {}", name);
            }
        }
        let _ = write!(text, " Z={}", (flags >> 4) & 0x07);
        let rcode = (flags & 0x0F) as u8;
        match ResponseCode::from_u8(rcode) {
            Some(code) => {
                let _ = write!(text, " {}", code);
            }
            None => {
                let _ = write!(text, " RCODE={}?", rcode);
            }
        }
        self.line(format_args!("{}", text));

        let mut counts = [0u16; 4];
        for (slot, label) in counts
            .iter_mut()
            .zip(["QDCOUNT", "ANCOUNT", "NSCOUNT", "ARCOUNT"])
        {
            let at = self.pos;
            *slot = self.u16()?;
            self.line(format_args!("{}: {}: {}", at, label, slot));
        }
        if counts[0] != 1 {
            self.line(format_args!("Error: QDCOUNT must be 1"));
        }

        self.line(format_args!("QUESTION SECTION:"));
        for _ in 0..counts[0] {
            self.name()?;
            let at = self.pos;
            let qtype = self.u16()?;
            self.line(format_args!(
                "{}: QTYPE: {} ({})",
                at,
                RecordType::from_u16(qtype),
                qtype
            ));
            let at = self.pos;
            let qclass = self.u16()?;
            self.line(format_args!("{}: QCLASS: {}", at, qclass));
        }

        for (title, empty, count) in [
            ("ANSWER SECTION:", "(no entries in answer section)", counts[1]),
            ("NS SECTION:", "(no entries in ns section)", counts[2]),
            ("ADDITIONAL SECTION:", "(no entries in ar section)", counts[3]),
        ] {
            self.line(format_args!("{}", title));
            if count == 0 {
                self.line(format_args!("{}", empty));
            }
            for _ in 0..count {
                self.record()?;
            }
        }
        Some(())
    }

    fn name(&mut self) -> Option<()> {
        loop {
            let at = self.pos;
            let len_byte = self.u8()?;
            match len_byte >> 6 {
                0 if len_byte == 0 => {
                    self.line(format_args!("{}: Null label", at));
                    return Some(());
                }
                0 => {
                    let len = len_byte as usize;
                    let text = self.text(len)?;
                    self.line(format_args!("{}: Label: {}", at, text));
                }
                3 => {
                    let low = self.u8()?;
                    let offset = (((len_byte & 0x3F) as u16) << 8) | low as u16;
                    self.line(format_args!("{}: Pointer ==> {}", at, offset));
                    return Some(());
                }
                other => {
                    self.line(format_args!("{}: Unknown label type: {}", at, other));
                    return Some(());
                }
            }
        }
    }

    fn record(&mut self) -> Option<()> {
        self.line(format_args!("ResourceRecord:"));
        self.name()?;
        let at = self.pos;
        let rtype = self.u16()?;
        let record_type = RecordType::from_u16(rtype);
        self.line(format_args!("{}: TYPE: {} ({})", at, record_type, rtype));
        let at = self.pos;
        let class = self.u16()?;
        self.line(format_args!("{}: CLASS: {}", at, class));
        let at = self.pos;
        let ttl = self.u32()?;
        self.line(format_args!("{}: TTL: {}", at, ttl as i32));
        let at = self.pos;
        let rdlength = self.u16()? as usize;
        self.line(format_args!("{}: RDLENGTH: {}", at, rdlength));

        let start = self.pos;
        self.buf.get(start..start + rdlength)?;
        match record_type {
            RecordType::A if rdlength == 4 => {
                let b = [
                    self.buf[start],
                    self.buf[start + 1],
                    self.buf[start + 2],
                    self.buf[start + 3],
                ];
                self.line(format_args!("{}: {}.{}.{}.{}", start, b[0], b[1], b[2], b[3]));
            }
            RecordType::NS | RecordType::CNAME => self.name()?,
            RecordType::MX => {
                let preference = self.u16()?;
                self.line(format_args!("{}: PREFERENCE: {}", start, preference));
                self.name()?;
            }
            RecordType::TXT => {
                let end = start + rdlength;
                while self.pos < end {
                    let at = self.pos;
                    let len = self.u8()? as usize;
                    let text = self.text(len)?;
                    self.line(format_args!("{}: TEXT: \"{}\"", at, text));
                }
            }
            _ => self.line(format_args!("{}: ({} bytes not decoded)", start, rdlength)),
        }
        self.pos = start + rdlength;
        Some(())
    }
}
