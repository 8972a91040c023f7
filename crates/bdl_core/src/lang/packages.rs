//! Builtin package types.
//!
//! Types such as `base.StringBuffer` or `om.DomNode` are provided by the runtime, not by source files. They
//! are the last stop of type resolution: a name that no scope, included file, sibling module or referenced
//! project defines may still be a package type.
//!
//! ## Notes
//! - Lookup is case-insensitive, like every other BDL name.
//! - A type may be referenced with its package prefix (`base.Channel`) or, for the `base` package only,
//!   without it (`Channel`).
//!
//! ## Examples
//! ```rust
//! use bdl_core::lang::packages::{self, PackageTypeId};
//!
//! assert_eq!(packages::from_str("base.StringBuffer"), Some(PackageTypeId::StringBuffer));
//! assert_eq!(packages::from_str("om.domnode"), Some(PackageTypeId::DomNode));
//! assert_eq!(packages::from_str("channel"), Some(PackageTypeId::Channel));
//! assert_eq!(packages::from_str("ui.DomNode"), None);
//! ```

/// Stable identifier for every builtin package type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageTypeId {
    // base
    StringBuffer,
    StringTokenizer,
    Channel,
    SqlHandle,
    TypeInfo,
    MessageServer,
    // om
    DomDocument,
    DomNode,
    NodeList,
    SaxAttributes,
    XmlReader,
    XmlWriter,
    // ui
    Interface,
    Window,
    Form,
    Dialog,
    ComboBox,
    DragDrop,
    // util
    JsonObject,
    JsonArray,
    HashMap,
    Math,
    Strings,
    // os
    Path,
}

/// Runtime package a type lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Package {
    Base,
    Om,
    Ui,
    Util,
    Os,
}

impl Package {
    pub fn as_str(self) -> &'static str {
        match self {
            Package::Base => "base",
            Package::Om => "om",
            Package::Ui => "ui",
            Package::Util => "util",
            Package::Os => "os",
        }
    }
}

/// Metadata for a package type.
#[derive(Debug, Clone, Copy)]
pub struct PackageTypeInfo {
    pub id: PackageTypeId,
    pub package: Package,
    pub name: &'static str,
    pub description: &'static str,
    /// Method names, used for hover and member checks.
    pub methods: &'static [&'static str],
}

impl PackageTypeInfo {
    /// `package.Name`, as shown to users.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.package.as_str(), self.name)
    }
}

use Package as P;
use PackageTypeId as T;

pub const PACKAGE_TYPES: &[PackageTypeInfo] = &[
    info(
        T::StringBuffer,
        P::Base,
        "StringBuffer",
        "Mutable character buffer.",
        &["append", "clear", "equals", "getLength", "getCharAt", "replace", "subString", "toString", "trim"],
    ),
    info(
        T::StringTokenizer,
        P::Base,
        "StringTokenizer",
        "Splits a string into tokens.",
        &["countTokens", "hasMoreTokens", "nextToken"],
    ),
    info(
        T::Channel,
        P::Base,
        "Channel",
        "File, pipe and socket streams.",
        &["openFile", "openPipe", "openClientSocket", "readLine", "writeLine", "read", "write", "close", "isEof"],
    ),
    info(
        T::SqlHandle,
        P::Base,
        "SqlHandle",
        "Dynamic SQL statement handle.",
        &["prepare", "open", "fetch", "close", "execute", "setParameter", "getResultCount", "getResultValue"],
    ),
    info(
        T::TypeInfo,
        P::Base,
        "TypeInfo",
        "Serializes program variables to DOM nodes.",
        &["create", "describe"],
    ),
    info(
        T::MessageServer,
        P::Base,
        "MessageServer",
        "Sends events between running programs.",
        &["connect", "send"],
    ),
    info(
        T::DomDocument,
        P::Om,
        "DomDocument",
        "XML document.",
        &["create", "createElement", "getDocumentElement", "load", "save", "selectByXPath"],
    ),
    info(
        T::DomNode,
        P::Om,
        "DomNode",
        "Element of an XML document.",
        &["appendChild", "createChild", "getAttribute", "setAttribute", "getFirstChild", "getParent", "getTagName", "selectByPath", "toString"],
    ),
    info(
        T::NodeList,
        P::Om,
        "NodeList",
        "Result of an XPath selection.",
        &["getLength", "item"],
    ),
    info(
        T::SaxAttributes,
        P::Om,
        "SaxAttributes",
        "Attributes of a SAX element event.",
        &["getLength", "getName", "getValue"],
    ),
    info(
        T::XmlReader,
        P::Om,
        "XmlReader",
        "Streaming XML reader.",
        &["fileReader", "read", "getEvent", "getTagName", "getAttributes"],
    ),
    info(
        T::XmlWriter,
        P::Om,
        "XmlWriter",
        "Streaming XML writer.",
        &["fileWriter", "startDocument", "endDocument", "startElement", "endElement", "characters"],
    ),
    info(
        T::Interface,
        P::Ui,
        "Interface",
        "The running user interface.",
        &["getDocument", "getRootNode", "loadStyles", "refresh", "setText"],
    ),
    info(
        T::Window,
        P::Ui,
        "Window",
        "A program window.",
        &["forName", "getCurrent", "getForm", "createForm", "setText"],
    ),
    info(
        T::Form,
        P::Ui,
        "Form",
        "A form displayed in a window.",
        &["setElementHidden", "setFieldHidden", "getNode", "loadToolBar", "loadActionDefaults"],
    ),
    info(
        T::Dialog,
        P::Ui,
        "Dialog",
        "The active interactive dialog.",
        &["getCurrent", "setActionActive", "setFieldActive", "getCurrentRow", "setCurrentRow", "accept", "nextField"],
    ),
    info(
        T::ComboBox,
        P::Ui,
        "ComboBox",
        "Combobox form item.",
        &["forName", "addItem", "clear", "getItemCount"],
    ),
    info(
        T::DragDrop,
        P::Ui,
        "DragDrop",
        "Drag and drop event state.",
        &["getBuffer", "setBuffer", "setOperation", "selectMimeType"],
    ),
    info(
        T::JsonObject,
        P::Util,
        "JSONObject",
        "JSON object value.",
        &["create", "parse", "get", "put", "has", "remove", "toString", "toFGL", "fromFGL"],
    ),
    info(
        T::JsonArray,
        P::Util,
        "JSONArray",
        "JSON array value.",
        &["create", "parse", "get", "put", "getLength", "toString", "toFGL", "fromFGL"],
    ),
    info(
        T::HashMap,
        P::Util,
        "HashMap",
        "String-keyed map.",
        &["create", "get", "put", "containsKey", "remove", "size", "keys"],
    ),
    info(
        T::Math,
        P::Util,
        "Math",
        "Mathematical functions.",
        &["sqrt", "pow", "rand", "srand", "pi", "exp", "log"],
    ),
    info(
        T::Strings,
        P::Util,
        "Strings",
        "String helpers.",
        &["base64Encode", "base64Decode", "urlEncode", "urlDecode"],
    ),
    info(
        T::Path,
        P::Os,
        "Path",
        "File system helpers.",
        &["exists", "isDirectory", "join", "basename", "dirname", "delete", "copy", "rename", "size"],
    ),
];

/// Full metadata.
///
/// ## Panics
/// - If the registry is missing an entry for `id`.
pub fn info_for(id: PackageTypeId) -> &'static PackageTypeInfo {
    PACKAGE_TYPES
        .iter()
        .find(|t| t.id == id)
        .expect("INVARIANT: package type info missing")
}

/// Lookup by `package.Name` or, for the `base` package, by bare `Name`.
pub fn from_str(name: &str) -> Option<PackageTypeId> {
    let (package, name) = match name.split_once('.') {
        Some((package, name)) => (Some(package), name),
        None => (None, name),
    };
    PACKAGE_TYPES
        .iter()
        .find(|t| {
            let package_matches = match package {
                Some(p) => t.package.as_str().eq_ignore_ascii_case(p),
                None => t.package == Package::Base,
            };
            package_matches && t.name.eq_ignore_ascii_case(name)
        })
        .map(|t| t.id)
}

/// Return `true` if `method` is a method of the package type (case-insensitive).
pub fn has_method(id: PackageTypeId, method: &str) -> bool {
    info_for(id).methods.iter().any(|m| m.eq_ignore_ascii_case(method))
}

const fn info(
    id: PackageTypeId,
    package: Package,
    name: &'static str,
    description: &'static str,
    methods: &'static [&'static str],
) -> PackageTypeInfo {
    PackageTypeInfo {
        id,
        package,
        name,
        description,
        methods,
    }
}
