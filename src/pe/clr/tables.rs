//! The `#~`/`#-` metadata tables stream (spec §4.11, ECMA-335 II.22/II.24).
//!
//! The header names which of the 45 tables are present and how many rows each has; from
//! there, every table's row layout is a fixed sequence of fixed-width columns whose width is a
//! pure function of [`IndexSizes`] (the three heap-index widths plus the row count of every
//! other table, since simple and coded indexes widen once their target table grows past
//! `2^16`/`2^(16-tag_bits)` rows). [`Col`] is that function, shared between sizing a table
//! (before we've decoded a single row of it) and reading it.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use scroll::Pread;

use crate::error;

/// One of the 45 metadata tables defined by ECMA-335 II.22. Discriminants are the table's bit
/// position in [`TablesStreamHeader::valid`], which doubles as its row-count array index.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub enum TableId {
    Module = 0x00,
    TypeRef = 0x01,
    TypeDef = 0x02,
    FieldPtr = 0x03,
    Field = 0x04,
    MethodPtr = 0x05,
    MethodDef = 0x06,
    ParamPtr = 0x07,
    Param = 0x08,
    InterfaceImpl = 0x09,
    MemberRef = 0x0A,
    Constant = 0x0B,
    CustomAttribute = 0x0C,
    FieldMarshal = 0x0D,
    DeclSecurity = 0x0E,
    ClassLayout = 0x0F,
    FieldLayout = 0x10,
    StandAloneSig = 0x11,
    EventMap = 0x12,
    EventPtr = 0x13,
    Event = 0x14,
    PropertyMap = 0x15,
    PropertyPtr = 0x16,
    Property = 0x17,
    MethodSemantics = 0x18,
    MethodImpl = 0x19,
    ModuleRef = 0x1A,
    TypeSpec = 0x1B,
    ImplMap = 0x1C,
    FieldRva = 0x1D,
    EncLog = 0x1E,
    EncMap = 0x1F,
    Assembly = 0x20,
    AssemblyProcessor = 0x21,
    AssemblyOs = 0x22,
    AssemblyRef = 0x23,
    AssemblyRefProcessor = 0x24,
    AssemblyRefOs = 0x25,
    File = 0x26,
    ExportedType = 0x27,
    ManifestResource = 0x28,
    NestedClass = 0x29,
    GenericParam = 0x2A,
    MethodSpec = 0x2B,
    GenericParamConstraint = 0x2C,
}

/// Every [`TableId`], in ascending bit order -- the order rows counts are read in and tables
/// are decoded in (spec §4.11).
pub const ALL_TABLE_IDS: [TableId; 45] = [
    TableId::Module,
    TableId::TypeRef,
    TableId::TypeDef,
    TableId::FieldPtr,
    TableId::Field,
    TableId::MethodPtr,
    TableId::MethodDef,
    TableId::ParamPtr,
    TableId::Param,
    TableId::InterfaceImpl,
    TableId::MemberRef,
    TableId::Constant,
    TableId::CustomAttribute,
    TableId::FieldMarshal,
    TableId::DeclSecurity,
    TableId::ClassLayout,
    TableId::FieldLayout,
    TableId::StandAloneSig,
    TableId::EventMap,
    TableId::EventPtr,
    TableId::Event,
    TableId::PropertyMap,
    TableId::PropertyPtr,
    TableId::Property,
    TableId::MethodSemantics,
    TableId::MethodImpl,
    TableId::ModuleRef,
    TableId::TypeSpec,
    TableId::ImplMap,
    TableId::FieldRva,
    TableId::EncLog,
    TableId::EncMap,
    TableId::Assembly,
    TableId::AssemblyProcessor,
    TableId::AssemblyOs,
    TableId::AssemblyRef,
    TableId::AssemblyRefProcessor,
    TableId::AssemblyRefOs,
    TableId::File,
    TableId::ExportedType,
    TableId::ManifestResource,
    TableId::NestedClass,
    TableId::GenericParam,
    TableId::MethodSpec,
    TableId::GenericParamConstraint,
];

/// One of the 13 coded-index families (spec §4.11); each packs a table tag into the low
/// `tag_bits` of the index.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CodedIndexKind {
    TypeDefOrRef,
    ResolutionScope,
    MemberRefParent,
    HasConstant,
    HasCustomAttribute,
    CustomAttributeType,
    HasFieldMarshal,
    HasDeclSecurity,
    HasSemantics,
    MethodDefOrRef,
    MemberForwarded,
    Implementation,
    TypeOrMethodDef,
}

impl CodedIndexKind {
    /// Number of low bits in the index reserved for the table tag.
    pub fn tag_bits(self) -> u32 {
        match self {
            CodedIndexKind::TypeDefOrRef => 2,
            CodedIndexKind::ResolutionScope => 2,
            CodedIndexKind::MemberRefParent => 3,
            CodedIndexKind::HasConstant => 2,
            CodedIndexKind::HasCustomAttribute => 5,
            CodedIndexKind::CustomAttributeType => 3,
            CodedIndexKind::HasFieldMarshal => 1,
            CodedIndexKind::HasDeclSecurity => 2,
            CodedIndexKind::HasSemantics => 1,
            CodedIndexKind::MethodDefOrRef => 1,
            CodedIndexKind::MemberForwarded => 1,
            CodedIndexKind::Implementation => 2,
            CodedIndexKind::TypeOrMethodDef => 1,
        }
    }

    /// The tables this family can reference, indexed by tag value. `None` marks a tag value
    /// ECMA-335 reserves but leaves unused (e.g. `CustomAttributeType` tags 0, 1, 4).
    pub fn tables(self) -> &'static [Option<TableId>] {
        use TableId::*;
        match self {
            CodedIndexKind::TypeDefOrRef => &[Some(TypeDef), Some(TypeRef), Some(TypeSpec)],
            CodedIndexKind::ResolutionScope => {
                &[Some(Module), Some(ModuleRef), Some(AssemblyRef), Some(TypeRef)]
            }
            CodedIndexKind::MemberRefParent => &[
                Some(TypeDef),
                Some(TypeRef),
                Some(ModuleRef),
                Some(MethodDef),
                Some(TypeSpec),
            ],
            CodedIndexKind::HasConstant => &[Some(Field), Some(Param), Some(Property)],
            CodedIndexKind::HasCustomAttribute => &[
                Some(MethodDef),
                Some(Field),
                Some(TypeRef),
                Some(TypeDef),
                Some(Param),
                Some(InterfaceImpl),
                Some(MemberRef),
                Some(Module),
                Some(DeclSecurity),
                Some(Property),
                Some(Event),
                Some(StandAloneSig),
                Some(ModuleRef),
                Some(TypeSpec),
                Some(Assembly),
                Some(AssemblyRef),
                Some(File),
                Some(ExportedType),
                Some(ManifestResource),
                Some(GenericParam),
                Some(GenericParamConstraint),
                Some(MethodSpec),
            ],
            CodedIndexKind::CustomAttributeType => {
                &[None, None, Some(MethodDef), Some(MemberRef), None]
            }
            CodedIndexKind::HasFieldMarshal => &[Some(Field), Some(Param)],
            CodedIndexKind::HasDeclSecurity => &[Some(TypeDef), Some(MethodDef), Some(Assembly)],
            CodedIndexKind::HasSemantics => &[Some(Event), Some(Property)],
            CodedIndexKind::MethodDefOrRef => &[Some(MethodDef), Some(MemberRef)],
            CodedIndexKind::MemberForwarded => &[Some(Field), Some(MethodDef)],
            CodedIndexKind::Implementation => {
                &[Some(File), Some(AssemblyRef), Some(ExportedType)]
            }
            CodedIndexKind::TypeOrMethodDef => &[Some(TypeDef), Some(MethodDef)],
        }
    }

    /// Splits a decoded coded-index value into the table it names and the 1-based row id
    /// within that table. `None` if the tag is out of range or names an unused slot.
    pub fn decode(self, raw: u32) -> Option<(TableId, u32)> {
        let tag_bits = self.tag_bits();
        let tag = (raw & ((1u32 << tag_bits) - 1)) as usize;
        let rid = raw >> tag_bits;
        self.tables().get(tag).copied().flatten().map(|t| (t, rid))
    }
}

/// The widths needed to decode a single row of any table: the three heap-index widths, plus
/// every table's row count (so simple/coded index widths can be computed on demand).
#[derive(Debug, Clone)]
pub struct IndexSizes {
    pub string: u8,
    pub guid: u8,
    pub blob: u8,
    pub row_counts: [u32; 45],
}

impl IndexSizes {
    fn simple(&self, table: TableId) -> usize {
        if self.row_counts[table as usize] > 0xFFFF {
            4
        } else {
            2
        }
    }

    fn coded(&self, kind: CodedIndexKind) -> usize {
        let limit = 1u32 << (16 - kind.tag_bits());
        let wide = kind
            .tables()
            .iter()
            .flatten()
            .any(|t| self.row_counts[*t as usize] > limit);
        if wide {
            4
        } else {
            2
        }
    }
}

/// One column of a table row: either a fixed-width scalar, a heap index, a same-table-width
/// index into another table, or a coded index tagging one of several tables.
#[derive(Debug, Copy, Clone)]
enum Col {
    U8,
    U16,
    U32,
    Str,
    Guid,
    Blob,
    Idx(TableId),
    Coded(CodedIndexKind),
}

impl Col {
    fn size(self, sizes: &IndexSizes) -> usize {
        match self {
            Col::U8 => 1,
            Col::U16 => 2,
            Col::U32 => 4,
            Col::Str => sizes.string as usize,
            Col::Guid => sizes.guid as usize,
            Col::Blob => sizes.blob as usize,
            Col::Idx(t) => sizes.simple(t),
            Col::Coded(k) => sizes.coded(k),
        }
    }

    fn read(self, cur: &mut Cursor<'_>, sizes: &IndexSizes) -> error::Result<u64> {
        Ok(match self {
            Col::U8 => cur.read_u8()? as u64,
            Col::U16 => cur.read_u16()? as u64,
            Col::U32 => cur.read_u32()? as u64,
            Col::Str => cur.read_wide(sizes.string)? as u64,
            Col::Guid => cur.read_wide(sizes.guid)? as u64,
            Col::Blob => cur.read_wide(sizes.blob)? as u64,
            Col::Idx(t) => cur.read_wide(if sizes.simple(t) == 4 { 4 } else { 2 })? as u64,
            Col::Coded(k) => cur.read_wide(if sizes.coded(k) == 4 { 4 } else { 2 })? as u64,
        })
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn read_u8(&mut self) -> error::Result<u8> {
        Ok(self.bytes.gread_with(&mut self.offset, scroll::LE)?)
    }

    fn read_u16(&mut self) -> error::Result<u16> {
        Ok(self.bytes.gread_with(&mut self.offset, scroll::LE)?)
    }

    fn read_u32(&mut self) -> error::Result<u32> {
        Ok(self.bytes.gread_with(&mut self.offset, scroll::LE)?)
    }

    /// Reads a 2- or 4-byte little-endian index, depending on `width`.
    fn read_wide(&mut self, width: u8) -> error::Result<u32> {
        if width == 4 {
            self.read_u32()
        } else {
            Ok(self.read_u16()? as u32)
        }
    }
}

fn row_size(cols: &[Col], sizes: &IndexSizes) -> usize {
    cols.iter().map(|c| c.size(sizes)).sum()
}

fn read_row(cols: &[Col], cur: &mut Cursor<'_>, sizes: &IndexSizes) -> error::Result<Vec<u64>> {
    let mut out = Vec::with_capacity(cols.len());
    for col in cols {
        out.push(col.read(cur, sizes)?);
    }
    Ok(out)
}

macro_rules! row_struct {
    ($name:ident { $($field:ident),* $(,)? }) => {
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $name {
            $(pub $field: u32,)*
        }

        impl $name {
            fn from_raw(raw: &[u64]) -> Self {
                let mut it = raw.iter().copied();
                $name {
                    $($field: it.next().unwrap_or(0) as u32,)*
                }
            }
        }
    };
}

row_struct!(ModuleRow { generation, name, mvid, enc_id, enc_base_id });
row_struct!(TypeRefRow { resolution_scope, name, namespace });
row_struct!(TypeDefRow { flags, name, namespace, extends, field_list, method_list });
row_struct!(FieldPtrRow { field });
row_struct!(FieldRow { flags, name, signature });
row_struct!(MethodPtrRow { method });
row_struct!(MethodDefRow { rva, impl_flags, flags, name, signature, param_list });
row_struct!(ParamPtrRow { param });
row_struct!(ParamRow { flags, sequence, name });
row_struct!(InterfaceImplRow { class, interface });
row_struct!(MemberRefRow { class, name, signature });
row_struct!(ConstantRow { kind, parent, value });
row_struct!(CustomAttributeRow { parent, attr_type, value });
row_struct!(FieldMarshalRow { parent, native_type });
row_struct!(DeclSecurityRow { action, parent, permission_set });
row_struct!(ClassLayoutRow { packing_size, class_size, parent });
row_struct!(FieldLayoutRow { offset, field });
row_struct!(StandAloneSigRow { signature });
row_struct!(EventMapRow { parent, event_list });
row_struct!(EventPtrRow { event });
row_struct!(EventRow { event_flags, name, event_type });
row_struct!(PropertyMapRow { parent, property_list });
row_struct!(PropertyPtrRow { property });
row_struct!(PropertyRow { flags, name, property_type });
row_struct!(MethodSemanticsRow { semantics, method, association });
row_struct!(MethodImplRow { class, method_body, method_declaration });
row_struct!(ModuleRefRow { name });
row_struct!(TypeSpecRow { signature });
row_struct!(ImplMapRow { mapping_flags, member_forwarded, import_name, import_scope });
row_struct!(FieldRvaRow { rva, field });
row_struct!(EncLogRow { token, func_code });
row_struct!(EncMapRow { token });
row_struct!(AssemblyRow {
    hash_alg_id,
    major_version,
    minor_version,
    build_number,
    revision_number,
    flags,
    public_key,
    name,
    culture,
});
row_struct!(AssemblyProcessorRow { processor });
row_struct!(AssemblyOsRow { os_platform_id, os_major_version, os_minor_version });
row_struct!(AssemblyRefRow {
    major_version,
    minor_version,
    build_number,
    revision_number,
    flags,
    public_key_or_token,
    name,
    culture,
    hash_value,
});
row_struct!(AssemblyRefProcessorRow { processor, assembly_ref });
row_struct!(AssemblyRefOsRow {
    os_platform_id,
    os_major_version,
    os_minor_version,
    assembly_ref,
});
row_struct!(FileRow { flags, name, hash_value });
row_struct!(ExportedTypeRow { flags, type_def_id, type_name, type_namespace, implementation });
row_struct!(ManifestResourceRow { offset, flags, name, implementation });
row_struct!(NestedClassRow { nested_class, enclosing_class });
row_struct!(GenericParamRow { number, flags, owner, name });
row_struct!(MethodSpecRow { method, instantiation });
row_struct!(GenericParamConstraintRow { owner, constraint });

/// The decoded rows of a single table, tagged by which of the 45 table kinds they belong to.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum TableRows {
    Module(Vec<ModuleRow>),
    TypeRef(Vec<TypeRefRow>),
    TypeDef(Vec<TypeDefRow>),
    FieldPtr(Vec<FieldPtrRow>),
    Field(Vec<FieldRow>),
    MethodPtr(Vec<MethodPtrRow>),
    MethodDef(Vec<MethodDefRow>),
    ParamPtr(Vec<ParamPtrRow>),
    Param(Vec<ParamRow>),
    InterfaceImpl(Vec<InterfaceImplRow>),
    MemberRef(Vec<MemberRefRow>),
    Constant(Vec<ConstantRow>),
    CustomAttribute(Vec<CustomAttributeRow>),
    FieldMarshal(Vec<FieldMarshalRow>),
    DeclSecurity(Vec<DeclSecurityRow>),
    ClassLayout(Vec<ClassLayoutRow>),
    FieldLayout(Vec<FieldLayoutRow>),
    StandAloneSig(Vec<StandAloneSigRow>),
    EventMap(Vec<EventMapRow>),
    EventPtr(Vec<EventPtrRow>),
    Event(Vec<EventRow>),
    PropertyMap(Vec<PropertyMapRow>),
    PropertyPtr(Vec<PropertyPtrRow>),
    Property(Vec<PropertyRow>),
    MethodSemantics(Vec<MethodSemanticsRow>),
    MethodImpl(Vec<MethodImplRow>),
    ModuleRef(Vec<ModuleRefRow>),
    TypeSpec(Vec<TypeSpecRow>),
    ImplMap(Vec<ImplMapRow>),
    FieldRva(Vec<FieldRvaRow>),
    EncLog(Vec<EncLogRow>),
    EncMap(Vec<EncMapRow>),
    Assembly(Vec<AssemblyRow>),
    AssemblyProcessor(Vec<AssemblyProcessorRow>),
    AssemblyOs(Vec<AssemblyOsRow>),
    AssemblyRef(Vec<AssemblyRefRow>),
    AssemblyRefProcessor(Vec<AssemblyRefProcessorRow>),
    AssemblyRefOs(Vec<AssemblyRefOsRow>),
    File(Vec<FileRow>),
    ExportedType(Vec<ExportedTypeRow>),
    ManifestResource(Vec<ManifestResourceRow>),
    NestedClass(Vec<NestedClassRow>),
    GenericParam(Vec<GenericParamRow>),
    MethodSpec(Vec<MethodSpecRow>),
    GenericParamConstraint(Vec<GenericParamConstraintRow>),
}

/// One decoded table: its id, declared row count, and rows.
#[derive(Debug, Clone)]
pub struct MetadataTable {
    pub id: TableId,
    pub row_count: u32,
    pub rows: TableRows,
}

/// The `#~`/`#-` tables-stream header (spec §4.11).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct TablesStreamHeader {
    pub reserved: u32,
    pub major_version: u8,
    pub minor_version: u8,
    pub heap_sizes: u8,
    pub rid: u8,
    pub valid: u64,
    pub sorted: u64,
}

impl TablesStreamHeader {
    fn parse(cur: &mut Cursor<'_>) -> error::Result<Self> {
        Ok(TablesStreamHeader {
            reserved: cur.read_u32()?,
            major_version: cur.read_u8()?,
            minor_version: cur.read_u8()?,
            heap_sizes: cur.read_u8()?,
            rid: cur.read_u8()?,
            valid: {
                let lo = cur.read_u32()? as u64;
                let hi = cur.read_u32()? as u64;
                lo | (hi << 32)
            },
            sorted: {
                let lo = cur.read_u32()? as u64;
                let hi = cur.read_u32()? as u64;
                lo | (hi << 32)
            },
        })
    }

    fn is_present(&self, id: TableId) -> bool {
        self.valid & (1u64 << (id as u8)) != 0
    }
}

/// The decoded `#~`/`#-` stream: header, per-table row counts, heap-index widths, and the
/// tables themselves, keyed by [`TableId`] (spec §4.11, §3 `Clr` data model).
#[derive(Debug, Clone)]
pub struct TablesStream<'a> {
    pub header: TablesStreamHeader,
    pub row_counts: [u32; 45],
    pub string_idx_size: u8,
    pub guid_idx_size: u8,
    pub blob_idx_size: u8,
    pub tables: BTreeMap<TableId, MetadataTable>,
    _marker: core::marker::PhantomData<&'a ()>,
}

impl<'a> TablesStream<'a> {
    /// Parses the raw `#~`/`#-` stream contents (spec §4.11). Decoding one table never aborts
    /// decoding of the rest: a table whose row data runs past the end of `data` is logged and
    /// skipped, and remaining tables are attempted from the next table's expected offset is
    /// unknowable in that case, so parsing stops there (the declared sizes are the only way to
    /// locate subsequent tables).
    pub fn parse(data: &'a [u8]) -> error::Result<Self> {
        let mut cur = Cursor { bytes: data, offset: 0 };
        let header = TablesStreamHeader::parse(&mut cur)?;

        let string_idx_size = if header.heap_sizes & 0x1 != 0 { 4 } else { 2 };
        let guid_idx_size = if header.heap_sizes & 0x2 != 0 { 4 } else { 2 };
        let blob_idx_size = if header.heap_sizes & 0x4 != 0 { 4 } else { 2 };

        let mut row_counts = [0u32; 45];
        for id in ALL_TABLE_IDS {
            if header.is_present(id) {
                row_counts[id as usize] = cur.read_u32()?;
            }
        }

        let sizes = IndexSizes {
            string: string_idx_size,
            guid: guid_idx_size,
            blob: blob_idx_size,
            row_counts,
        };

        let mut tables = BTreeMap::new();
        for id in ALL_TABLE_IDS {
            if !header.is_present(id) {
                continue;
            }
            let row_count = row_counts[id as usize];
            let cols = columns_for(id);
            let size = row_size(cols, &sizes);
            let total = row_count as usize * size;
            if cur.offset + total > cur.bytes.len() {
                log::debug!(
                    "CLR table {:?} declares {} rows but the tables stream is too short; stopping",
                    id,
                    row_count
                );
                break;
            }
            let mut rows = Vec::with_capacity(row_count as usize);
            let mut failed = false;
            for _ in 0..row_count {
                match read_row(cols, &mut cur, &sizes) {
                    Ok(raw) => rows.push(raw),
                    Err(err) => {
                        log::debug!("CLR table {:?} row decode failed: {}", id, err);
                        failed = true;
                        break;
                    }
                }
            }
            if failed {
                // Advance past the table's declared span anyway so later tables stay aligned.
                cur.offset += total - rows.len() * size;
            }
            tables.insert(
                id,
                MetadataTable {
                    id,
                    row_count,
                    rows: build_rows(id, rows),
                },
            );
        }

        Ok(TablesStream {
            header,
            row_counts,
            string_idx_size,
            guid_idx_size,
            blob_idx_size,
            tables,
            _marker: core::marker::PhantomData,
        })
    }

    /// Looks up a single decoded table by id.
    pub fn table(&self, id: TableId) -> Option<&MetadataTable> {
        self.tables.get(&id)
    }
}

fn columns_for(id: TableId) -> &'static [Col] {
    use Col::*;
    use CodedIndexKind::*;
    use TableId::*;
    match id {
        Module => &[U16, Str, Guid, Guid, Guid],
        TypeRef => &[Coded(ResolutionScope), Str, Str],
        TypeDef => &[U32, Str, Str, Coded(TypeDefOrRef), Idx(Field), Idx(MethodDef)],
        FieldPtr => &[Idx(Field)],
        Field => &[U16, Str, Blob],
        MethodPtr => &[Idx(MethodDef)],
        MethodDef => &[U32, U16, U16, Str, Blob, Idx(Param)],
        ParamPtr => &[Idx(Param)],
        Param => &[U16, U16, Str],
        InterfaceImpl => &[Idx(TypeDef), Coded(TypeDefOrRef)],
        MemberRef => &[Coded(MemberRefParent), Str, Blob],
        Constant => &[U8, U8, Coded(HasConstant), Blob],
        CustomAttribute => &[Coded(HasCustomAttribute), Coded(CustomAttributeType), Blob],
        FieldMarshal => &[Coded(HasFieldMarshal), Blob],
        DeclSecurity => &[U16, Coded(HasDeclSecurity), Blob],
        ClassLayout => &[U16, U32, Idx(TypeDef)],
        FieldLayout => &[U32, Idx(Field)],
        StandAloneSig => &[Blob],
        EventMap => &[Idx(TypeDef), Idx(Event)],
        EventPtr => &[Idx(Event)],
        Event => &[U16, Str, Coded(TypeDefOrRef)],
        PropertyMap => &[Idx(TypeDef), Idx(Property)],
        PropertyPtr => &[Idx(Property)],
        Property => &[U16, Str, Blob],
        MethodSemantics => &[U16, Idx(MethodDef), Coded(HasSemantics)],
        MethodImpl => &[Idx(TypeDef), Coded(MethodDefOrRef), Coded(MethodDefOrRef)],
        ModuleRef => &[Str],
        TypeSpec => &[Blob],
        ImplMap => &[U16, Coded(MemberForwarded), Str, Idx(ModuleRef)],
        FieldRva => &[U32, Idx(Field)],
        EncLog => &[U32, U32],
        EncMap => &[U32],
        Assembly => &[U32, U16, U16, U16, U16, U32, Blob, Str, Str],
        AssemblyProcessor => &[U32],
        AssemblyOs => &[U32, U32, U32],
        AssemblyRef => &[U16, U16, U16, U16, U32, Blob, Str, Str, Blob],
        AssemblyRefProcessor => &[U32, Idx(AssemblyRef)],
        AssemblyRefOs => &[U32, U32, U32, Idx(AssemblyRef)],
        File => &[U32, Str, Blob],
        ExportedType => &[U32, U32, Str, Str, Coded(Implementation)],
        ManifestResource => &[U32, U32, Str, Coded(Implementation)],
        NestedClass => &[Idx(TypeDef), Idx(TypeDef)],
        GenericParam => &[U16, U16, Coded(TypeOrMethodDef), Str],
        MethodSpec => &[Coded(MethodDefOrRef), Blob],
        GenericParamConstraint => &[Idx(GenericParam), Coded(TypeDefOrRef)],
    }
}

fn build_rows(id: TableId, raw_rows: Vec<Vec<u64>>) -> TableRows {
    macro_rules! build {
        ($variant:ident, $row:ident) => {
            TableRows::$variant(raw_rows.iter().map(|r| $row::from_raw(r)).collect())
        };
    }
    match id {
        TableId::Module => build!(Module, ModuleRow),
        TableId::TypeRef => build!(TypeRef, TypeRefRow),
        TableId::TypeDef => build!(TypeDef, TypeDefRow),
        TableId::FieldPtr => build!(FieldPtr, FieldPtrRow),
        TableId::Field => build!(Field, FieldRow),
        TableId::MethodPtr => build!(MethodPtr, MethodPtrRow),
        TableId::MethodDef => build!(MethodDef, MethodDefRow),
        TableId::ParamPtr => build!(ParamPtr, ParamPtrRow),
        TableId::Param => build!(Param, ParamRow),
        TableId::InterfaceImpl => build!(InterfaceImpl, InterfaceImplRow),
        TableId::MemberRef => build!(MemberRef, MemberRefRow),
        TableId::Constant => build!(Constant, ConstantRow),
        TableId::CustomAttribute => build!(CustomAttribute, CustomAttributeRow),
        TableId::FieldMarshal => build!(FieldMarshal, FieldMarshalRow),
        TableId::DeclSecurity => build!(DeclSecurity, DeclSecurityRow),
        TableId::ClassLayout => build!(ClassLayout, ClassLayoutRow),
        TableId::FieldLayout => build!(FieldLayout, FieldLayoutRow),
        TableId::StandAloneSig => build!(StandAloneSig, StandAloneSigRow),
        TableId::EventMap => build!(EventMap, EventMapRow),
        TableId::EventPtr => build!(EventPtr, EventPtrRow),
        TableId::Event => build!(Event, EventRow),
        TableId::PropertyMap => build!(PropertyMap, PropertyMapRow),
        TableId::PropertyPtr => build!(PropertyPtr, PropertyPtrRow),
        TableId::Property => build!(Property, PropertyRow),
        TableId::MethodSemantics => build!(MethodSemantics, MethodSemanticsRow),
        TableId::MethodImpl => build!(MethodImpl, MethodImplRow),
        TableId::ModuleRef => build!(ModuleRef, ModuleRefRow),
        TableId::TypeSpec => build!(TypeSpec, TypeSpecRow),
        TableId::ImplMap => build!(ImplMap, ImplMapRow),
        TableId::FieldRva => build!(FieldRva, FieldRvaRow),
        TableId::EncLog => build!(EncLog, EncLogRow),
        TableId::EncMap => build!(EncMap, EncMapRow),
        TableId::Assembly => build!(Assembly, AssemblyRow),
        TableId::AssemblyProcessor => build!(AssemblyProcessor, AssemblyProcessorRow),
        TableId::AssemblyOs => build!(AssemblyOs, AssemblyOsRow),
        TableId::AssemblyRef => build!(AssemblyRef, AssemblyRefRow),
        TableId::AssemblyRefProcessor => build!(AssemblyRefProcessor, AssemblyRefProcessorRow),
        TableId::AssemblyRefOs => build!(AssemblyRefOs, AssemblyRefOsRow),
        TableId::File => build!(File, FileRow),
        TableId::ExportedType => build!(ExportedType, ExportedTypeRow),
        TableId::ManifestResource => build!(ManifestResource, ManifestResourceRow),
        TableId::NestedClass => build!(NestedClass, NestedClassRow),
        TableId::GenericParam => build!(GenericParam, GenericParamRow),
        TableId::MethodSpec => build!(MethodSpec, MethodSpecRow),
        TableId::GenericParamConstraint => {
            build!(GenericParamConstraint, GenericParamConstraintRow)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A minimal `#~` stream: only `Module` (table 0) present, one row, narrow heaps.
    fn build_module_only_stream() -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0u32.to_le_bytes()); // reserved
        bytes.push(2); // major
        bytes.push(0); // minor
        bytes.push(0); // heap_sizes: all narrow
        bytes.push(1); // rid
        bytes.extend_from_slice(&1u32.to_le_bytes()); // valid lo: bit 0 set
        bytes.extend_from_slice(&0u32.to_le_bytes()); // valid hi
        bytes.extend_from_slice(&0u64.to_le_bytes()); // sorted
        bytes.extend_from_slice(&1u32.to_le_bytes()); // Module row count = 1
        // Module row: generation(u16) name(u16) mvid(u16) enc_id(u16) enc_base_id(u16)
        bytes.extend_from_slice(&0u16.to_le_bytes());
        bytes.extend_from_slice(&0x2CD7u16.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&0u16.to_le_bytes());
        bytes.extend_from_slice(&0u16.to_le_bytes());
        bytes
    }

    #[test]
    fn decodes_module_table() {
        let bytes = build_module_only_stream();
        let stream = TablesStream::parse(&bytes).unwrap();
        assert_eq!(stream.row_counts[TableId::Module as usize], 1);
        let TableRows::Module(rows) = &stream.table(TableId::Module).unwrap().rows else {
            panic!("expected Module rows");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, 0x2CD7);
        assert_eq!(rows[0].mvid, 1);
        assert!(stream.table(TableId::TypeDef).is_none());
    }

    #[test]
    fn coded_index_decode_splits_tag_and_rid() {
        // TypeDefOrRef, tag_bits=2: tag 1 => TypeRef, rid = raw >> 2
        let (table, rid) = CodedIndexKind::TypeDefOrRef.decode(0b1001).unwrap();
        assert_eq!(table, TableId::TypeRef);
        assert_eq!(rid, 0b10);
    }

    #[test]
    fn wide_index_kicks_in_past_64k_rows() {
        let mut row_counts = [0u32; 45];
        row_counts[TableId::TypeDef as usize] = 0x1_0001;
        let sizes = IndexSizes { string: 2, guid: 2, blob: 2, row_counts };
        assert_eq!(sizes.simple(TableId::TypeDef), 4);
        assert_eq!(sizes.simple(TableId::TypeRef), 2);
    }
}
