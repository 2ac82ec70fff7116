//! Fixed-width record layouts.
//!
//! A layout is an ordered list of named column ranges, 1-based and inclusive,
//! that must tile the full record width with no gaps or overlaps. Layouts are
//! static data, validated once at first use and shared read-only across all
//! decode calls.

use std::sync::OnceLock;
use thiserror::Error;

/// Semantic type of a field, driving per-field post-processing in the
/// decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text: right padding trimmed, interior space runs collapsed.
    Text,
    /// Integer token; unparseable content becomes the NaN sentinel.
    Integer,
    /// Integer token with an implicit decimal point.
    Price { decimals: u32 },
    /// `YYYYMMDD`; all-zero or unparseable content becomes no-date.
    Date,
}

/// One named column range of a layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    /// First column, 1-based inclusive.
    pub first: usize,
    /// Last column, inclusive.
    pub last: usize,
    pub kind: FieldKind,
}

/// Record kinds with a published column layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// The daily quote record ("registro de cotações") of COTAHIST files.
    Quote,
}

/// A validated, immutable fixed-width layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLayout {
    name: &'static str,
    width: usize,
    fields: Vec<FieldSpec>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("field '{0}' has an inverted column range")]
    InvertedRange(&'static str),

    #[error("gap or overlap at field '{name}': starts at column {found}, expected {expected}")]
    NotContiguous {
        name: &'static str,
        found: usize,
        expected: usize,
    },

    #[error("declared width {width} does not match last field end {end}")]
    WidthMismatch { width: usize, end: usize },

    #[error("layout has no fields")]
    Empty,
}

impl RecordLayout {
    /// Builds a layout, enforcing the tiling invariant: fields start at
    /// column 1, are contiguous and non-overlapping, and end at `width`.
    pub fn new(
        name: &'static str,
        width: usize,
        fields: Vec<FieldSpec>,
    ) -> Result<Self, LayoutError> {
        if fields.is_empty() {
            return Err(LayoutError::Empty);
        }

        let mut expected = 1;
        for field in &fields {
            if field.last < field.first {
                return Err(LayoutError::InvertedRange(field.name));
            }
            if field.first != expected {
                return Err(LayoutError::NotContiguous {
                    name: field.name,
                    found: field.first,
                    expected,
                });
            }
            expected = field.last + 1;
        }

        if expected - 1 != width {
            return Err(LayoutError::WidthMismatch {
                width,
                end: expected - 1,
            });
        }

        Ok(Self {
            name,
            width,
            fields,
        })
    }

    /// The shared layout for a record kind.
    pub fn for_kind(kind: RecordKind) -> &'static RecordLayout {
        static QUOTE: OnceLock<RecordLayout> = OnceLock::new();
        match kind {
            RecordKind::Quote => QUOTE.get_or_init(quote_layout),
        }
    }

    /// Shorthand for the daily quote layout.
    pub fn quote() -> &'static RecordLayout {
        Self::for_kind(RecordKind::Quote)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }
}

/// The 245-column COTAHIST quote record, per the exchange's published
/// layout specification.
fn quote_layout() -> RecordLayout {
    use FieldKind::*;

    let f = |name, first, last, kind| FieldSpec {
        name,
        first,
        last,
        kind,
    };

    let price = Price { decimals: 2 };

    RecordLayout::new(
        "registro",
        245,
        vec![
            f("tipreg", 1, 2, Integer),
            f("data", 3, 10, Date),
            f("bdi_id", 11, 12, Integer),
            f("simbolo", 13, 24, Text),
            f("tipo_mercado_id", 25, 27, Integer),
            f("nome_resumido", 28, 39, Text),
            f("especificacao", 40, 49, Text),
            f("prazo", 50, 52, Integer),
            f("simbolo_moeda", 53, 56, Text),
            f("preco_abertura", 57, 69, price),
            f("preco_maximo", 70, 82, price),
            f("preco_minimo", 83, 95, price),
            f("preco_medio", 96, 108, price),
            f("preco_ultimo_negocio", 109, 121, price),
            f("preco_melhor_oferta_compra", 122, 134, price),
            f("preco_melhor_oferta_venda", 135, 147, price),
            f("quantidade_negocios", 148, 152, Integer),
            f("quantidade_titulos_negociados", 153, 170, Integer),
            f("volume_negociado", 171, 188, price),
            f("preco_exercicio", 189, 201, price),
            f("indice_correcao_id", 202, 202, Integer),
            f("data_vencimento", 203, 210, Date),
            f("fator_cotacao", 211, 217, Integer),
            f("preco_exercicio_pontos", 218, 230, Price { decimals: 6 }),
            f("codisi", 231, 242, Text),
            f("dismes", 243, 245, Integer),
        ],
    )
    .expect("quote layout tiles [1, 245]")
}
