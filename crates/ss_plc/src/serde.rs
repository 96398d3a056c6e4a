use std::fmt;

use serde::{
    de::{self, SeqAccess, Visitor},
    ser::SerializeSeq,
    Deserialize, Serialize,
};

use crate::file::PlcEntry;
use crate::table::CODE_COUNT;

/// Records serialize as a list of five hex strings, matching the text dump
impl Serialize for PlcEntry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(CODE_COUNT))?;
        for code in &self.codes {
            seq.serialize_element(&format!("{code:08X}"))?;
        }
        seq.end()
    }
}

struct PlcEntryVisitor;

impl<'de> Visitor<'de> for PlcEntryVisitor {
    type Value = PlcEntry;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a list of five hex codes")
    }

    fn visit_seq<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut codes = [0u32; CODE_COUNT];
        for (i, code) in codes.iter_mut().enumerate() {
            let text = access
                .next_element::<String>()?
                .ok_or_else(|| de::Error::invalid_length(i, &self))?;
            *code = u32::from_str_radix(text.trim_start_matches("0x"), 16)
                .map_err(|_| de::Error::invalid_value(de::Unexpected::Str(&text), &self))?;
        }
        if access.next_element::<de::IgnoredAny>()?.is_some() {
            return Err(de::Error::invalid_length(CODE_COUNT + 1, &self));
        }

        Ok(PlcEntry { codes })
    }
}

impl<'de> Deserialize<'de> for PlcEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(PlcEntryVisitor)
    }
}
