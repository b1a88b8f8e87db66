//! Text decoding and encoding in accordance with the
//! _Specific Character Set_ (0008,0005) of a data set.
//!
//! Only single-byte repertoires and the Unicode repertoires are supported.
//! Code extension techniques (ISO 2022 escape sequences) are not:
//! a multi-valued character set resolves to its first recognized term.

use encoding::all::{
    GB18030, ISO_8859_1, ISO_8859_2, ISO_8859_3, ISO_8859_4, ISO_8859_5, ISO_8859_6, ISO_8859_7,
    ISO_8859_8, UTF_8, WINDOWS_874,
};
use encoding::{DecoderTrap, EncoderTrap, Encoding, EncodingRef, RawDecoder, StringWriter};
use snafu::{Backtrace, Snafu};
use std::borrow::Cow;

/// An error type for text encoding issues.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum EncodeTextError {
    /// The underlying encoder rejected the text.
    #[snafu(display("Could not encode text: {}", message))]
    EncodeText {
        message: Cow<'static, str>,
        backtrace: Backtrace,
    },
}

/// An error type for text decoding issues.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum DecodeTextError {
    /// The underlying decoder rejected the text.
    #[snafu(display("Could not decode text: {}", message))]
    DecodeText {
        message: Cow<'static, str>,
        backtrace: Backtrace,
    },
}

/// An enum type for all currently supported character sets.
#[derive(Debug, Default, Copy, Clone, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum SpecificCharacterSet {
    /// **ISO-IR 6**: the default character set.
    #[default]
    Default,
    /// **ISO-IR 100** (ISO-8859-1): Latin alphabet no. 1
    IsoIr100,
    /// **ISO-IR 101** (ISO-8859-2): Latin alphabet no. 2
    IsoIr101,
    /// **ISO-IR 109** (ISO-8859-3): Latin alphabet no. 3
    IsoIr109,
    /// **ISO-IR 110** (ISO-8859-4): Latin alphabet no. 4
    IsoIr110,
    /// **ISO-IR 144** (ISO-8859-5): Latin/Cyrillic
    IsoIr144,
    /// **ISO-IR 127** (ISO-8859-6): Latin/Arabic
    IsoIr127,
    /// **ISO-IR 126** (ISO-8859-7): Latin/Greek
    IsoIr126,
    /// **ISO-IR 138** (ISO-8859-8): Latin/Hebrew
    IsoIr138,
    /// **ISO-IR 166** (TIS 620-2533): Thai
    IsoIr166,
    /// **ISO-IR 192**: Unicode in UTF-8
    IsoIr192,
    /// **GB18030**: Simplified Chinese
    Gb18030,
}

impl SpecificCharacterSet {
    /// Obtain the specific character set identified by the given code string.
    ///
    /// Both the plain and the ISO 2022 defined terms are recognized.
    ///
    /// # Example
    ///
    /// ```
    /// # use dcmstack_encoding::text::SpecificCharacterSet;
    /// let character_set = SpecificCharacterSet::from_code("ISO_IR 100");
    /// assert_eq!(character_set, Some(SpecificCharacterSet::IsoIr100));
    /// ```
    pub fn from_code(code: &str) -> Option<Self> {
        use self::SpecificCharacterSet::*;
        match code.trim_matches(|c: char| c == ' ' || c == '\0') {
            "" | "Default" | "ISO_IR 6" | "ISO 2022 IR 6" => Some(Default),
            "ISO_IR 100" | "ISO 2022 IR 100" => Some(IsoIr100),
            "ISO_IR 101" | "ISO 2022 IR 101" => Some(IsoIr101),
            "ISO_IR 109" | "ISO 2022 IR 109" => Some(IsoIr109),
            "ISO_IR 110" | "ISO 2022 IR 110" => Some(IsoIr110),
            "ISO_IR 144" | "ISO 2022 IR 144" => Some(IsoIr144),
            "ISO_IR 127" | "ISO 2022 IR 127" => Some(IsoIr127),
            "ISO_IR 126" | "ISO 2022 IR 126" => Some(IsoIr126),
            "ISO_IR 138" | "ISO 2022 IR 138" => Some(IsoIr138),
            "ISO_IR 166" | "ISO 2022 IR 166" => Some(IsoIr166),
            "ISO_IR 192" => Some(IsoIr192),
            "GB18030" | "GBK" => Some(Gb18030),
            _ => None,
        }
    }

    /// Resolve the character set from the full (possibly multi-valued)
    /// attribute value, using the first recognized term.
    pub fn from_attribute(value: &str) -> Option<Self> {
        value.split('\\').find_map(|term| match term.trim() {
            "" => None,
            term => Self::from_code(term),
        })
    }

    /// The defined term of this character set.
    pub fn name(self) -> &'static str {
        use self::SpecificCharacterSet::*;
        match self {
            Default => "ISO_IR 6",
            IsoIr100 => "ISO_IR 100",
            IsoIr101 => "ISO_IR 101",
            IsoIr109 => "ISO_IR 109",
            IsoIr110 => "ISO_IR 110",
            IsoIr144 => "ISO_IR 144",
            IsoIr127 => "ISO_IR 127",
            IsoIr126 => "ISO_IR 126",
            IsoIr138 => "ISO_IR 138",
            IsoIr166 => "ISO_IR 166",
            IsoIr192 => "ISO_IR 192",
            Gb18030 => "GB18030",
        }
    }

    fn encoding(self) -> EncodingRef {
        use self::SpecificCharacterSet::*;
        match self {
            // 8859-1 is a superset of the default repertoire
            Default | IsoIr100 => ISO_8859_1,
            IsoIr101 => ISO_8859_2,
            IsoIr109 => ISO_8859_3,
            IsoIr110 => ISO_8859_4,
            IsoIr144 => ISO_8859_5,
            IsoIr127 => ISO_8859_6,
            IsoIr126 => ISO_8859_7,
            IsoIr138 => ISO_8859_8,
            IsoIr166 => WINDOWS_874,
            IsoIr192 => UTF_8,
            Gb18030 => GB18030,
        }
    }

    /// Decode the given bytes into a string.
    /// Unmappable bytes are replaced with an octal escape (e.g. `\377`).
    pub fn decode(self, text: &[u8]) -> Result<String, DecodeTextError> {
        self.encoding()
            .decode(text, DecoderTrap::Call(decode_text_trap))
            .map_err(|message| DecodeTextSnafu { message }.build())
    }

    /// Encode the given string into bytes.
    pub fn encode(self, text: &str) -> Result<Vec<u8>, EncodeTextError> {
        self.encoding()
            .encode(text, EncoderTrap::Strict)
            .map_err(|message| EncodeTextSnafu { message }.build())
    }
}

fn decode_text_trap(
    _decoder: &mut dyn RawDecoder,
    input: &[u8],
    output: &mut dyn StringWriter,
) -> bool {
    let c = input[0];
    output.write_char('\\');
    output.write_char((((c & 0o300) >> 6) + b'0') as char);
    output.write_char((((c & 0o070) >> 3) + b'0') as char);
    output.write_char(((c & 0o007) + b'0') as char);
    true
}
