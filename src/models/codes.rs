// Wire-coded enumerations. Agents send small integer codes; unknown codes from
// newer agents are kept as `Other(code)` and stored unchanged.

use serde::{Deserialize, Serialize};

macro_rules! wire_code_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $code:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "u8", into = "u8")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
            /// Code not known to this server version.
            Other(u8),
        }

        impl From<u8> for $name {
            fn from(code: u8) -> Self {
                match code {
                    $($code => Self::$variant,)+
                    other => Self::Other(other),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                match value {
                    $($name::$variant => $code,)+
                    $name::Other(code) => code,
                }
            }
        }

        impl $name {
            pub fn code(self) -> u8 {
                self.into()
            }

            pub fn is_known(self) -> bool {
                !matches!(self, Self::Other(_))
            }
        }
    };
}

wire_code_enum! {
    /// Host-wide hardware-accelerated decoding mode.
    HwAccel {
        No = 0,
        Intel = 1,
        IntelVpp = 2,
        Nvidia = 3,
        DirectX = 4,
    }
}

wire_code_enum! {
    /// Per-camera decoding mode; `Default` defers to the host setting.
    HwAccelCamera {
        Default = 0,
        No = 1,
        Intel = 2,
        IntelVpp = 3,
        Nvidia = 4,
        DirectX = 5,
    }
}

wire_code_enum! {
    CameraType {
        Network = 0,
        Usb = 1,
        ScreenCapture = 2,
        Broadcast = 3,
    }
}

wire_code_enum! {
    ScreenCapType {
        Off = 0,
        Gdi = 1,
        DirectX = 2,
    }
}

wire_code_enum! {
    RecordingTriggerType {
        Off = 0,
        Continuous = 1,
        Triggered = 2,
        Periodic = 3,
        TriggeredPlusPeriodic = 4,
        ContinuousPlusAlerts = 5,
    }
}

wire_code_enum! {
    RecordingFormat {
        Bvr = 0,
        Avi = 1,
        Mp4 = 2,
        Wmv = 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_map_to_variants() {
        assert_eq!(HwAccel::from(3), HwAccel::Nvidia);
        assert_eq!(CameraType::from(2), CameraType::ScreenCapture);
        assert_eq!(RecordingFormat::Mp4.code(), 2);
    }

    #[test]
    fn unknown_codes_pass_through() {
        let hw = HwAccelCamera::from(42);
        assert_eq!(hw, HwAccelCamera::Other(42));
        assert!(!hw.is_known());
        assert_eq!(hw.code(), 42);
    }

    #[test]
    fn serializes_as_integer_code() {
        let json = serde_json::to_string(&RecordingTriggerType::Periodic).unwrap();
        assert_eq!(json, "3");
        let back: RecordingTriggerType = serde_json::from_str("200").unwrap();
        assert_eq!(back, RecordingTriggerType::Other(200));
    }
}
