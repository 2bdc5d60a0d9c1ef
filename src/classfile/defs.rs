//! Generic classfile-specific definitions

/// Header of Java class file (magic number)
pub const MAGIC: u32 = 0xCAFEBABE;

/// Name of a constructor
pub const CONSTRUCTOR_METHOD_NAME: &str = "<init>";

/// Name of a static initializer
pub const STATIC_INITIALIZER_METHOD_NAME: &str = "<clinit>";

/// Descriptor of a static initializer
pub const STATIC_INITIALIZER_DESCRIPTOR: &str = "()V";

/// Field descriptor of an int array
pub const INT_ARRAY_DESCRIPTOR: &str = "[I";

/// Field descriptor of a long
pub const LONG_DESCRIPTOR: &str = "J";

/// JVM version constants
pub mod major_versions {
    pub const JAVA_1_1: u16 = 45;
    pub const JAVA_5_0: u16 = 49;
    pub const JAVA_6_0: u16 = 50;
    pub const JAVA_7: u16 = 51;
    pub const JAVA_8: u16 = 52;
    pub const JAVA_11: u16 = 55;
    pub const JAVA_17: u16 = 61;
    pub const JAVA_21: u16 = 65;
}

/// Lowest major version the parser accepts
pub const MIN_SUPPORTED_MAJOR: u16 = major_versions::JAVA_1_1;

/// Highest major version the parser accepts
pub const MAX_SUPPORTED_MAJOR: u16 = major_versions::JAVA_21;

/// First major version whose methods carry StackMapTable frames
pub const STACK_MAP_MAJOR: u16 = major_versions::JAVA_6_0;

/// Access flags for classes, fields, and methods
pub mod access_flags {
    pub const ACC_PUBLIC: u16 = 0x0001;
    pub const ACC_PRIVATE: u16 = 0x0002;
    pub const ACC_PROTECTED: u16 = 0x0004;
    pub const ACC_STATIC: u16 = 0x0008;
    pub const ACC_FINAL: u16 = 0x0010;
    pub const ACC_SUPER: u16 = 0x0020;
    pub const ACC_VOLATILE: u16 = 0x0040;
    pub const ACC_TRANSIENT: u16 = 0x0080;
    pub const ACC_NATIVE: u16 = 0x0100;
    pub const ACC_INTERFACE: u16 = 0x0200;
    pub const ACC_ABSTRACT: u16 = 0x0400;
    pub const ACC_STRICT: u16 = 0x0800;
    pub const ACC_SYNTHETIC: u16 = 0x1000;
    pub const ACC_ANNOTATION: u16 = 0x2000;
    pub const ACC_ENUM: u16 = 0x4000;
    pub const ACC_MODULE: u16 = 0x8000;
}

/// Attribute names the codec knows how to decode.
///
/// Everything else is carried as an opaque `(name, bytes)` pair and emitted
/// unchanged, so foreign attributes survive a round-trip.
pub mod attribute_names {
    pub const CODE: &str = "Code";
    pub const CONSTANT_VALUE: &str = "ConstantValue";
    pub const STACK_MAP_TABLE: &str = "StackMapTable";
    pub const BOOTSTRAP_METHODS: &str = "BootstrapMethods";
    pub const LINE_NUMBER_TABLE: &str = "LineNumberTable";
    pub const LOCAL_VARIABLE_TABLE: &str = "LocalVariableTable";
    pub const LOCAL_VARIABLE_TYPE_TABLE: &str = "LocalVariableTypeTable";
}
