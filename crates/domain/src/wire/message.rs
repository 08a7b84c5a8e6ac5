use super::{Header, Question, ResourceRecord, SectionCounts};
use crate::compressor::{Compressor, HEADER_LENGTH, MAX_POINTER_OFFSET};
use crate::errors::WireError;

pub const MAX_UDP_PAYLOAD: usize = 512;

/// A header, exactly one question and three ordered record sections.
///
/// Header counts are derived from the sections whenever the message is
/// built, so they cannot go stale.
#[derive(Debug, Clone)]
pub struct Message {
    header: Header,
    question: Question,
    answer: Vec<ResourceRecord>,
    authority: Vec<ResourceRecord>,
    additional: Vec<ResourceRecord>,
}

impl Message {
    pub fn new(
        header: Header,
        question: Question,
        answer: Vec<ResourceRecord>,
        authority: Vec<ResourceRecord>,
        additional: Vec<ResourceRecord>,
    ) -> Self {
        let mut message = Self {
            header,
            question,
            answer,
            authority,
            additional,
        };
        message.update_counts();
        message
    }

    pub fn query(id: u16, question: Question) -> Self {
        Self::new(Header::query(id), question, Vec::new(), Vec::new(), Vec::new())
    }

    fn update_counts(&mut self) {
        let counts = SectionCounts {
            question: 1,
            answer: section_count(&self.answer),
            authority: section_count(&self.authority),
            additional: section_count(&self.additional),
        };
        self.header = self.header.clone().with_counts(counts);
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn answer(&self) -> &[ResourceRecord] {
        &self.answer
    }

    pub fn authority(&self) -> &[ResourceRecord] {
        &self.authority
    }

    pub fn additional(&self) -> &[ResourceRecord] {
        &self.additional
    }

    pub fn records(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.answer
            .iter()
            .chain(self.authority.iter())
            .chain(self.additional.iter())
    }

    /// Reads the header and the question only. Trailing sections are ignored.
    pub fn parse_query(buf: &[u8]) -> Result<Self, WireError> {
        let header = Header::read(buf)?;
        let (question, _) = Question::read(buf, HEADER_LENGTH)?;
        Ok(Self::new(header, question, Vec::new(), Vec::new(), Vec::new()))
    }

    /// Reads every section.
    pub fn parse(buf: &[u8]) -> Result<Self, WireError> {
        let header = Header::read(buf)?;
        let counts = header.counts();
        let (question, mut pos) = Question::read(buf, HEADER_LENGTH)?;
        let mut sections: [Vec<ResourceRecord>; 3] = Default::default();
        for (section, count) in sections
            .iter_mut()
            .zip([counts.answer, counts.authority, counts.additional])
        {
            for _ in 0..count {
                let (record, next) = ResourceRecord::read(buf, pos)?;
                section.push(record);
                pos = next;
            }
        }
        let [answer, authority, additional] = sections;
        Ok(Self::new(header, question, answer, authority, additional))
    }

    /// Returns a copy whose names are compressed against one table, threaded
    /// through question, answer, authority and additional in that order.
    pub fn compress(&self) -> Result<Self, WireError> {
        let mut compressor = Compressor::new();
        let (question, mut offset) = self.question.compress(&mut compressor, HEADER_LENGTH)?;
        let mut sections: [Vec<ResourceRecord>; 3] = Default::default();
        for (out, records) in sections
            .iter_mut()
            .zip([&self.answer, &self.authority, &self.additional])
        {
            for record in records {
                let (compressed, next) = record.compress(&mut compressor, offset)?;
                out.push(compressed);
                offset = next;
            }
        }
        let [answer, authority, additional] = sections;
        Ok(Self::new(
            self.header.clone(),
            question,
            answer,
            authority,
            additional,
        ))
    }

    pub fn encoded_len(&self) -> usize {
        HEADER_LENGTH
            + self.question.encoded_len()
            + self.records().map(ResourceRecord::encoded_len).sum::<usize>()
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        self.header.write(out);
        self.question.write(out);
        for record in self.records() {
            record.write(out);
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.write(&mut out);
        out
    }

    /// Compressed bytes that fit a 512-byte datagram.
    ///
    /// The additional section goes first; if that is not enough the response
    /// carries only the question with TC set.
    pub fn encode_for_udp(&self) -> Result<Vec<u8>, WireError> {
        if let Some(bytes) = self.compress_to_fit()? {
            return Ok(bytes);
        }
        if let Some(bytes) = self.without_additional().compress_to_fit()? {
            return Ok(bytes);
        }
        Ok(self.truncated().compress()?.to_bytes())
    }

    /// Compressed bytes when they fit a datagram. A message whose plain
    /// encoding runs past the pointer window never fits and is not compressed.
    fn compress_to_fit(&self) -> Result<Option<Vec<u8>>, WireError> {
        if self.encoded_len() > MAX_POINTER_OFFSET {
            return Ok(None);
        }
        let compressed = self.compress()?;
        if compressed.encoded_len() > MAX_UDP_PAYLOAD {
            return Ok(None);
        }
        Ok(Some(compressed.to_bytes()))
    }

    pub fn without_additional(&self) -> Self {
        Self::new(
            self.header.clone(),
            self.question.clone(),
            self.answer.clone(),
            self.authority.clone(),
            Vec::new(),
        )
    }

    pub fn truncated(&self) -> Self {
        let mut header = self.header.clone();
        header.truncated = true;
        Self::new(
            header,
            self.question.clone(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
        )
    }
}

fn section_count(records: &[ResourceRecord]) -> u16 {
    u16::try_from(records.len()).unwrap_or(u16::MAX)
}
