//! Descriptor-kind metadata.
//!
//! One generic engine serves every descriptor type; a [`DescriptorKind`]
//! names the store collection a type lives in and a human label for logs
//! and errors. Consumers define further kinds the same way the built-ins
//! are defined here.

/// Metadata describing one descriptor type served by the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorKind {
    /// Store collection name, also the table-name prefix.
    pub collection: &'static str,
    /// Human-readable label used in log lines.
    pub label: &'static str,
}

/// AWS service descriptors.
pub const AWS_SERVICE: DescriptorKind =
    DescriptorKind { collection: "awsd", label: "AWS service descriptor" };

/// FPGA service descriptors.
pub const FPGA_SERVICE: DescriptorKind =
    DescriptorKind { collection: "fpgad", label: "FPGA service descriptor" };
