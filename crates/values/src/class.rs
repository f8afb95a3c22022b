use derive_more::Display;

/// Element class of a numeric array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum NumericClass {
    #[display(fmt = "double")]
    Double,
    #[display(fmt = "single")]
    Single,
    #[display(fmt = "int8")]
    Int8,
    #[display(fmt = "uint8")]
    UInt8,
    #[display(fmt = "int16")]
    Int16,
    #[display(fmt = "uint16")]
    UInt16,
    #[display(fmt = "int32")]
    Int32,
    #[display(fmt = "uint32")]
    UInt32,
    #[display(fmt = "int64")]
    Int64,
    #[display(fmt = "uint64")]
    UInt64,
}

impl NumericClass {
    pub const ALL: [NumericClass; 10] = [
        NumericClass::Double,
        NumericClass::Single,
        NumericClass::Int8,
        NumericClass::UInt8,
        NumericClass::Int16,
        NumericClass::UInt16,
        NumericClass::Int32,
        NumericClass::UInt32,
        NumericClass::Int64,
        NumericClass::UInt64,
    ];

    /// The class name as reported for a value of this class
    pub const fn name(self) -> &'static str {
        match self {
            NumericClass::Double => "double",
            NumericClass::Single => "single",
            NumericClass::Int8 => "int8",
            NumericClass::UInt8 => "uint8",
            NumericClass::Int16 => "int16",
            NumericClass::UInt16 => "uint16",
            NumericClass::Int32 => "int32",
            NumericClass::UInt32 => "uint32",
            NumericClass::Int64 => "int64",
            NumericClass::UInt64 => "uint64",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_name() {
        for class in NumericClass::ALL {
            assert_eq!(class.to_string(), class.name());
        }
    }
}
