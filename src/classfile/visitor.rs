//! Event-style traversal of a parsed class
//!
//! `accept` walks the tree in class-file order and hands each section to the
//! visitor. Visitors read; edits go through the `ClassFile` operations, which
//! leave every unvisited region to serialize exactly as parsed.

use super::attribute::AttributeInfo;
use super::class::ClassFile;
use super::field::FieldInfo;
use super::method::MethodInfo;

/// Capability set for class traversal. All methods default to "skip", so a
/// visitor implements only the events it cares about.
pub trait ClassVisitor {
    fn visit_header(&mut self, _class: &ClassFile) {}
    fn visit_field(&mut self, _class: &ClassFile, _field: &FieldInfo) {}
    fn visit_method(&mut self, _class: &ClassFile, _method: &MethodInfo) {}
    fn visit_attribute(&mut self, _class: &ClassFile, _attribute: &AttributeInfo) {}
}

/// Deliver header, fields, methods, then class attributes, in file order.
pub fn accept<V: ClassVisitor>(class: &ClassFile, visitor: &mut V) {
    visitor.visit_header(class);
    for field in &class.fields {
        visitor.visit_field(class, field);
    }
    for method in &class.methods {
        visitor.visit_method(class, method);
    }
    for attribute in &class.attributes {
        visitor.visit_attribute(class, attribute);
    }
}
