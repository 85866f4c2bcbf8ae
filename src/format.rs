//! Format metadata and detection.

use crate::flags::GmeType;

/// Static description of one format, as advertised by the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FormatDescriptor {
    pub format: GmeType,
    /// Console or computer the music was written for.
    pub system: &'static str,
    /// Upper-case file extension without the dot.
    pub extension: &'static str,
    /// Whether one file can hold more than one track.
    pub multi_track: bool,
}

impl GmeType {
    /// Detect format from header bytes. Returns None if unrecognized.
    ///
    /// Only the first four bytes are inspected.
    pub fn detect(data: &[u8]) -> Option<Self> {
        // VGZ: gzip magic 1F 8B
        if data.len() >= 2 && data[0] == 0x1F && data[1] == 0x8B {
            return Some(GmeType::Vgz);
        }

        let tag: &[u8; 4] = data.get(..4)?.try_into().ok()?;
        match tag {
            b"ZXAY" => Some(GmeType::Ay),
            b"GBS\x01" => Some(GmeType::Gbs),
            b"GYMX" => Some(GmeType::Gym),
            b"HESM" => Some(GmeType::Hes),
            b"KSCC" | b"KSSX" => Some(GmeType::Kss),
            b"NESM" => Some(GmeType::Nsf),
            b"NSFE" => Some(GmeType::Nsfe),
            b"SAP\r" | b"SAP\n" => Some(GmeType::Sap),
            b"SNES" => Some(GmeType::Spc),
            b"Vgm " => Some(GmeType::Vgm),
            _ => None,
        }
    }

    /// Detect format from file extension (case-insensitive, optional leading dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.strip_prefix('.').unwrap_or(ext);
        GmeType::ALL
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(ext))
    }

    /// File extension, upper-case, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            GmeType::Ay => "AY",
            GmeType::Gbs => "GBS",
            GmeType::Gym => "GYM",
            GmeType::Hes => "HES",
            GmeType::Kss => "KSS",
            GmeType::Nsf => "NSF",
            GmeType::Nsfe => "NSFE",
            GmeType::Sap => "SAP",
            GmeType::Spc => "SPC",
            GmeType::Vgm => "VGM",
            GmeType::Vgz => "VGZ",
        }
    }

    /// Console or computer the format comes from.
    pub fn system(self) -> &'static str {
        match self {
            GmeType::Ay => "ZX Spectrum",
            GmeType::Gbs => "Game Boy",
            GmeType::Gym => "Sega Genesis",
            GmeType::Hes => "PC Engine",
            GmeType::Kss => "MSX",
            GmeType::Nsf | GmeType::Nsfe => "Nintendo NES",
            GmeType::Sap => "Atari XL",
            GmeType::Spc => "Super Nintendo",
            GmeType::Vgm | GmeType::Vgz => "Sega SMS/Genesis",
        }
    }

    /// Whether a file can hold several tracks.
    ///
    /// GYM, SPC and VGM/VGZ files are always a single track.
    pub fn is_multi_track(self) -> bool {
        match self {
            GmeType::Ay
            | GmeType::Gbs
            | GmeType::Hes
            | GmeType::Kss
            | GmeType::Nsf
            | GmeType::Nsfe
            | GmeType::Sap => true,
            GmeType::Gym | GmeType::Spc | GmeType::Vgm | GmeType::Vgz => false,
        }
    }

    pub fn descriptor(self) -> FormatDescriptor {
        FormatDescriptor {
            format: self,
            system: self.system(),
            extension: self.extension(),
            multi_track: self.is_multi_track(),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for GmeType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for FormatDescriptor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut s = serializer.serialize_struct("FormatDescriptor", 4)?;
        s.serialize_field("format", &self.format)?;
        s.serialize_field("system", self.system)?;
        s.serialize_field("extension", self.extension)?;
        s.serialize_field("multi_track", &self.multi_track)?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_signatures() {
        let cases: [(&[u8], GmeType); 13] = [
            (b"ZXAYEMUL", GmeType::Ay),
            (b"GBS\x01\x0a\x01", GmeType::Gbs),
            (b"GYMX", GmeType::Gym),
            (b"HESM\x00", GmeType::Hes),
            (b"KSCC", GmeType::Kss),
            (b"KSSX\x00\x00", GmeType::Kss),
            (b"NESM\x1a\x01", GmeType::Nsf),
            (b"NSFE", GmeType::Nsfe),
            (b"SAP\r\nAUTHOR", GmeType::Sap),
            (b"SAP\nTYPE B", GmeType::Sap),
            (b"SNES-SPC700 Sound File Data", GmeType::Spc),
            (b"Vgm \x00\x10", GmeType::Vgm),
            (b"\x1f\x8b\x08\x00", GmeType::Vgz),
        ];
        for (data, expected) in cases {
            assert_eq!(GmeType::detect(data), Some(expected), "{data:?}");
        }
    }

    #[test]
    fn detect_rejects_unknown_and_short() {
        assert_eq!(GmeType::detect(b"RIFF\x00\x00\x00\x00WAVE"), None);
        assert_eq!(GmeType::detect(b"NES"), None);
        assert_eq!(GmeType::detect(b""), None);
        // GBS with an unknown version byte
        assert_eq!(GmeType::detect(b"GBS\x02"), None);
        // gzip only needs two bytes
        assert_eq!(GmeType::detect(b"\x1f\x8b"), Some(GmeType::Vgz));
    }

    #[test]
    fn from_extension_case_insensitive() {
        assert_eq!(GmeType::from_extension("nsf"), Some(GmeType::Nsf));
        assert_eq!(GmeType::from_extension("NSFe"), Some(GmeType::Nsfe));
        assert_eq!(GmeType::from_extension(".vgz"), Some(GmeType::Vgz));
        assert_eq!(GmeType::from_extension("mod"), None);
        assert_eq!(GmeType::from_extension(""), None);
    }

    #[test]
    fn extension_round_trip() {
        for format in GmeType::ALL {
            assert_eq!(GmeType::from_extension(format.extension()), Some(format));
        }
    }

    #[test]
    fn paired_formats_share_metadata() {
        assert_eq!(GmeType::Vgm.system(), GmeType::Vgz.system());
        assert!(!GmeType::Vgm.is_multi_track());
        assert!(!GmeType::Vgz.is_multi_track());
        assert!(GmeType::Nsfe.is_multi_track());
    }

    #[test]
    fn descriptor_fields() {
        let d = GmeType::Spc.descriptor();
        assert_eq!(d.format, GmeType::Spc);
        assert_eq!(d.system, "Super Nintendo");
        assert_eq!(d.extension, "SPC");
        assert!(!d.multi_track);
    }
}
