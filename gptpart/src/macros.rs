// SPDX-License-Identifier: MIT

#[macro_export]
/// Defines a set of GPT partition types, along with associated constants, predicates, and an enum for partition kinds.
///
/// This macro generates:
/// - A constant [`Guid`](crate::guid::Guid) for each partition type.
/// - A function to check if a partition entry matches a given type.
/// - An enum `GptPartitionKind` representing all defined partition types and an `Unknown` variant for unrecognized GUIDs.
/// - Implementations for converting between GUIDs and `GptPartitionKind`.
/// - A `Display` implementation for `GptPartitionKind`.
///
/// # Example
/// ```rust
/// use gptpart::define_partition_types;
///
/// define_partition_types! {
///     Esp => "EFI System Partition", (0xC12A7328, 0xF81F, 0x11D2, [0xBA, 0x4B], [0x00, 0xA0, 0xC9, 0x3E, 0xC9, 0x3B]),
///     LinuxFs => "Linux Filesystem", (0x0FC63DAF, 0x8483, 0x4772, [0x8E, 0x79], [0x3D, 0x69, 0xD8, 0x47, 0x7D, 0xE4]),
/// }
/// ```
///
/// # Parameters
/// - `$name`: Identifier for the partition type (used for enum variant and function/constant names).
/// - `$desc`: Human readable label.
/// - The GUID fields, in the order they appear in the canonical string.
///
/// # Generated Items
/// For each partition type:
/// - `pub const GPT_PARTITION_TYPE_<NAME>: Guid`
/// - `pub fn is_<name>_partition(entry: &GptEntry) -> bool`
///
/// Also generates:
/// - `pub enum GptPartitionKind`
/// - Implementations for `from_guid`, `as_guid`, `label`, and `Display` for `GptPartitionKind`.
///
/// # Note
/// This macro requires the `paste` crate for identifier concatenation.
macro_rules! define_partition_types {
    (
        $(
            $name:ident => $desc:expr, ($d1:expr, $d2:expr, $d3:expr, $seq:expr, $node:expr)
        ),+ $(,)?
    ) => {
        paste::paste! {
            $(
                #[doc = $desc]
                pub const [<GPT_PARTITION_TYPE_ $name:snake:upper>]: $crate::guid::Guid =
                    $crate::guid::Guid::from_fields($d1, $d2, $d3, $seq, $node);

                #[doc = concat!("Checks if a GPT partition is of type: ", $desc)]
                pub fn [<is_ $name:snake _partition>](
                    entry: &$crate::gpt::GptEntry,
                ) -> bool {
                    entry.type_guid == [<GPT_PARTITION_TYPE_ $name:snake:upper>]
                }
            )+

            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            pub enum GptPartitionKind {
                $($name,)+
                Unknown($crate::guid::Guid),
            }

            impl GptPartitionKind {
                pub fn from_guid(guid: &$crate::guid::Guid) -> Self {
                    match guid {
                        $(g if *g == [<GPT_PARTITION_TYPE_ $name:snake:upper>] => Self::$name,)+
                        other => Self::Unknown(*other),
                    }
                }

                pub fn as_guid(&self) -> $crate::guid::Guid {
                    match self {
                        $(Self::$name => [<GPT_PARTITION_TYPE_ $name:snake:upper>],)+
                        Self::Unknown(guid) => *guid,
                    }
                }

                /// Label from the table, `None` for unknown types.
                pub fn label(&self) -> Option<&'static str> {
                    match self {
                        $(Self::$name => Some($desc),)+
                        Self::Unknown(_) => None,
                    }
                }
            }

            impl core::fmt::Display for GptPartitionKind {
                fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                    match self {
                        $(Self::$name => f.write_str($desc),)+
                        Self::Unknown(guid) => write!(f, "{}", guid),
                    }
                }
            }
        }
    };
}
