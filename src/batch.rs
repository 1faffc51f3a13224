//! 배치 구성 모듈
//!
//! 레코드를 문서 단위로 묶고, 직렬화된 문서 크기를 바이트 단위로 정확히 계산합니다.
//! 문서는 레코드 JSON을 구분자로 이어 붙여 만들기 때문에 계산한 크기와
//! 실제로 저장되는 크기가 항상 같습니다.

use std::io::{self, Write};
use std::mem;

use crate::error::{ExportError, Result};
use crate::processor::FileRecord;

/// 문서 JSON 배치 형식
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DocumentLayout {
    /// 한 줄 압축 형식
    #[default]
    Compact,
    /// 2칸 들여쓰기 형식
    Pretty,
}

impl DocumentLayout {
    pub fn from_pretty(pretty: bool) -> Self {
        if pretty {
            DocumentLayout::Pretty
        } else {
            DocumentLayout::Compact
        }
    }

    fn open(&self) -> &'static str {
        match self {
            DocumentLayout::Compact => "[",
            DocumentLayout::Pretty => "[\n",
        }
    }

    fn separator(&self) -> &'static str {
        match self {
            DocumentLayout::Compact => ",",
            DocumentLayout::Pretty => ",\n",
        }
    }

    fn close(&self) -> &'static str {
        match self {
            DocumentLayout::Compact => "]",
            DocumentLayout::Pretty => "\n]",
        }
    }

    /// 레코드 하나를 배열 원소 형태로 직렬화
    pub fn encode(&self, record: &FileRecord) -> Result<String> {
        let to_error = |e: serde_json::Error| ExportError::SerializeError {
            file: record.path.clone(),
            reason: e.to_string(),
        };

        match self {
            DocumentLayout::Compact => serde_json::to_string(record).map_err(to_error),
            DocumentLayout::Pretty => {
                let json = serde_json::to_string_pretty(record).map_err(to_error)?;
                let indented: Vec<String> = json.lines().map(|line| format!("  {}", line)).collect();
                Ok(indented.join("\n"))
            }
        }
    }

    /// 원소 `count`개, 원소 바이트 합 `entries_len`인 문서의 크기
    pub fn document_size(&self, count: usize, entries_len: u64) -> u64 {
        if count == 0 {
            return 2; // "[]"
        }
        (self.open().len() + self.close().len()) as u64
            + entries_len
            + (self.separator().len() * (count - 1)) as u64
    }
}

/// 직렬화된 레코드
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRecord {
    /// 레코드 출력 경로
    pub path: String,
    /// 배열 원소로 들어갈 JSON
    pub json: String,
    /// 내용이 잘렸는지 여부
    pub truncated: bool,
}

impl EncodedRecord {
    pub fn encode(record: &FileRecord, layout: DocumentLayout) -> Result<Self> {
        Ok(Self {
            path: record.path.clone(),
            json: layout.encode(record)?,
            truncated: record.truncated,
        })
    }

    fn len(&self) -> u64 {
        self.json.len() as u64
    }
}

/// 문서 하나에 들어갈 레코드 묶음
#[derive(Debug, Clone, Default)]
pub struct Batch {
    layout: DocumentLayout,
    entries: Vec<EncodedRecord>,
    entries_len: u64,
}

impl Batch {
    pub fn new(layout: DocumentLayout) -> Self {
        Self {
            layout,
            entries: Vec::new(),
            entries_len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 직렬화된 문서 크기
    pub fn size(&self) -> u64 {
        self.layout.document_size(self.entries.len(), self.entries_len)
    }

    /// 레코드 하나를 더했을 때의 문서 크기
    pub fn size_with(&self, entry: &EncodedRecord) -> u64 {
        self.layout
            .document_size(self.entries.len() + 1, self.entries_len + entry.len())
    }

    pub fn push(&mut self, entry: EncodedRecord) {
        self.entries_len += entry.len();
        self.entries.push(entry);
    }

    /// 잘린 레코드 수
    pub fn truncated_count(&self) -> usize {
        self.entries.iter().filter(|e| e.truncated).count()
    }

    /// 문서 JSON을 기록하고 기록한 바이트 수를 반환
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<u64> {
        if self.entries.is_empty() {
            writer.write_all(b"[]")?;
            return Ok(2);
        }

        writer.write_all(self.layout.open().as_bytes())?;
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                writer.write_all(self.layout.separator().as_bytes())?;
            }
            writer.write_all(entry.json.as_bytes())?;
        }
        writer.write_all(self.layout.close().as_bytes())?;

        Ok(self.size())
    }
}

/// 문서당 제한
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLimits {
    /// 최대 레코드 수
    pub max_files: usize,
    /// 최대 문서 바이트 수
    pub max_bytes: u64,
}

/// 제한에 맞춰 레코드를 배치로 나누는 누산기
#[derive(Debug)]
pub struct Batcher {
    limits: BatchLimits,
    layout: DocumentLayout,
    current: Batch,
}

impl Batcher {
    pub fn new(limits: BatchLimits, layout: DocumentLayout) -> Self {
        Self {
            limits,
            layout,
            current: Batch::new(layout),
        }
    }

    pub fn layout(&self) -> DocumentLayout {
        self.layout
    }

    /// 레코드 추가
    ///
    /// 현재 배치가 가득 찼거나 레코드를 더하면 크기 제한을 넘는 경우,
    /// 현재 배치를 먼저 돌려주고 새 배치에 레코드를 넣습니다.
    /// 레코드 하나만으로 제한을 넘으면 그 레코드는 단독 배치가 됩니다.
    pub fn push(&mut self, entry: EncodedRecord) -> Option<Batch> {
        let full = self.current.len() >= self.limits.max_files;
        let too_big = self.current.size_with(&entry) > self.limits.max_bytes;

        let flushed = if !self.current.is_empty() && (full || too_big) {
            Some(mem::replace(&mut self.current, Batch::new(self.layout)))
        } else {
            None
        };

        self.current.push(entry);
        flushed
    }

    /// 남은 배치 반환 (비어 있으면 None)
    pub fn finish(&mut self) -> Option<Batch> {
        if self.current.is_empty() {
            None
        } else {
            Some(mem::replace(&mut self.current, Batch::new(self.layout)))
        }
    }

    /// 레코드가 단독 문서로 크기 제한 안에 들어가는지 확인
    pub fn fits_alone(&self, entry: &EncodedRecord) -> bool {
        self.layout.document_size(1, entry.len()) <= self.limits.max_bytes
    }

    /// 단독 문서가 크기 제한 안에 들어가도록 레코드 내용을 잘라 직렬화
    ///
    /// 내용을 모두 비워도 들어가지 않으면 원래 레코드를 그대로 돌려줍니다.
    pub fn encode_truncated(&self, record: FileRecord) -> Result<EncodedRecord> {
        let original = EncodedRecord::encode(&record, self.layout)?;
        if self.fits_alone(&original) {
            return Ok(original);
        }

        let mut emptied = record.clone();
        emptied.truncate_content(0);
        if !self.fits_alone(&EncodedRecord::encode(&emptied, self.layout)?) {
            return Ok(original);
        }

        let mut record = record;
        let mut encoded = original;
        while !self.fits_alone(&encoded) {
            let size = self.layout.document_size(1, encoded.len());
            let excess = (size - self.limits.max_bytes) as usize;
            let target = record.content.len().saturating_sub(excess.max(1));
            record.truncate_content(target);
            encoded = EncodedRecord::encode(&record, self.layout)?;
        }

        Ok(encoded)
    }
}
