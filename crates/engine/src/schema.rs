//! Static per-domain schema registry.
//!
//! Column positions are zero-based offsets into the pipe-split record, in
//! the generator's print order. Each position is entered exactly once, in
//! [`columns`]; everything else references it by name. Adding a domain is
//! a registry entry here, not matcher code.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::VerifyError;
use crate::model::Record;

// ---------------------------------------------------------------------------
// Domain
// ---------------------------------------------------------------------------

/// Retail channel whose sales/returns files are verified together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Catalog,
    Store,
    Web,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Catalog, Domain::Store, Domain::Web];

    /// File-name and generator-table prefix (`{prefix}_sales.dat`).
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Catalog => "catalog",
            Self::Store => "store",
            Self::Web => "web",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl FromStr for Domain {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        match name.to_ascii_lowercase().as_str() {
            "catalog" => Ok(Self::Catalog),
            "store" => Ok(Self::Store),
            "web" => Ok(Self::Web),
            _ => Err(VerifyError::UnknownDomain(name.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

/// One named column in a pipe-split record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldRef {
    pub name: &'static str,
    pub col: usize,
}

impl FieldRef {
    pub const fn new(name: &'static str, col: usize) -> Self {
        Self { name, col }
    }
}

/// A sale column and the return column it must agree with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldPair {
    pub sale: FieldRef,
    pub ret: FieldRef,
}

/// Ordered key components for each side. The key string is the raw field
/// values joined with `_`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct KeySpec {
    pub sale_parts: &'static [FieldRef],
    pub return_parts: &'static [FieldRef],
}

impl KeySpec {
    pub fn sale_key(&self, record: &Record) -> Option<String> {
        join_key(self.sale_parts, record)
    }

    pub fn return_key(&self, record: &Record) -> Option<String> {
        join_key(self.return_parts, record)
    }
}

/// `None` when any referenced column is out of bounds (short line).
fn join_key(parts: &[FieldRef], record: &Record) -> Option<String> {
    let mut key = String::new();
    for (i, part) in parts.iter().enumerate() {
        let value = record.get(part.col)?;
        if i > 0 {
            key.push('_');
        }
        key.push_str(value);
    }
    Some(key)
}

/// How sales are indexed and how a return is matched against them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Unique composite key, exactly one sale per key. `customer` is the
    /// store domain's extra mandatory customer-sk comparison.
    Direct { customer: Option<FieldPair> },
    /// Multi-valued item_sk key: scan the bucket for an order-number match
    /// first, fall back to item existence.
    TwoTier { order: FieldPair },
}

/// Complete verification rules for one domain.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Schema {
    pub domain: Domain,
    pub key: KeySpec,
    pub required: &'static [FieldPair],
    pub nullable: &'static [FieldPair],
    pub strategy: MatchStrategy,
}

impl Schema {
    pub fn for_domain(domain: Domain) -> &'static Schema {
        match domain {
            Domain::Catalog => &CATALOG,
            Domain::Store => &STORE,
            Domain::Web => &WEB,
        }
    }
}

// ---------------------------------------------------------------------------
// Column positions
// ---------------------------------------------------------------------------

/// Zero-based column offsets, one constant per referenced column.
pub mod columns {
    pub mod catalog {
        pub const CS_BILL_CUSTOMER_SK: usize = 3;
        pub const CS_BILL_CDEMO_SK: usize = 4;
        pub const CS_BILL_HDEMO_SK: usize = 5;
        pub const CS_BILL_ADDR_SK: usize = 6;
        pub const CS_CALL_CENTER_SK: usize = 11;
        pub const CS_CATALOG_PAGE_SK: usize = 12;
        pub const CS_SOLD_ITEM_SK: usize = 15;
        pub const CS_ORDER_NUMBER: usize = 17;

        pub const CR_ITEM_SK: usize = 2;
        pub const CR_REFUNDED_CUSTOMER_SK: usize = 3;
        pub const CR_REFUNDED_CDEMO_SK: usize = 4;
        pub const CR_REFUNDED_HDEMO_SK: usize = 5;
        pub const CR_REFUNDED_ADDR_SK: usize = 6;
        pub const CR_CALL_CENTER_SK: usize = 11;
        pub const CR_CATALOG_PAGE_SK: usize = 12;
        pub const CR_ORDER_NUMBER: usize = 16;
    }

    pub mod store {
        pub const SS_SOLD_ITEM_SK: usize = 2;
        pub const SS_SOLD_CUSTOMER_SK: usize = 3;
        pub const SS_TICKET_NUMBER: usize = 9;

        pub const SR_ITEM_SK: usize = 2;
        pub const SR_CUSTOMER_SK: usize = 3;
        pub const SR_TICKET_NUMBER: usize = 9;
    }

    pub mod web {
        pub const WS_ITEM_SK: usize = 3;
        pub const WS_WEB_PAGE_SK: usize = 12;
        pub const WS_ORDER_NUMBER: usize = 17;

        pub const WR_ITEM_SK: usize = 2;
        pub const WR_WEB_PAGE_SK: usize = 11;
        pub const WR_ORDER_NUMBER: usize = 13;
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

const fn pair(
    sale_name: &'static str,
    sale_col: usize,
    ret_name: &'static str,
    ret_col: usize,
) -> FieldPair {
    FieldPair {
        sale: FieldRef::new(sale_name, sale_col),
        ret: FieldRef::new(ret_name, ret_col),
    }
}

use columns::{catalog as ccol, store as scol, web as wcol};

const CATALOG_ORDER: FieldPair = pair(
    "cs_order_number",
    ccol::CS_ORDER_NUMBER,
    "cr_order_number",
    ccol::CR_ORDER_NUMBER,
);

static CATALOG: Schema = Schema {
    domain: Domain::Catalog,
    key: KeySpec {
        sale_parts: &[FieldRef::new("cs_sold_item_sk", ccol::CS_SOLD_ITEM_SK)],
        return_parts: &[FieldRef::new("cr_item_sk", ccol::CR_ITEM_SK)],
    },
    required: &[
        pair("cs_sold_item_sk", ccol::CS_SOLD_ITEM_SK, "cr_item_sk", ccol::CR_ITEM_SK),
        CATALOG_ORDER,
        pair(
            "cs_bill_customer_sk",
            ccol::CS_BILL_CUSTOMER_SK,
            "cr_refunded_customer_sk",
            ccol::CR_REFUNDED_CUSTOMER_SK,
        ),
        pair(
            "cs_bill_cdemo_sk",
            ccol::CS_BILL_CDEMO_SK,
            "cr_refunded_cdemo_sk",
            ccol::CR_REFUNDED_CDEMO_SK,
        ),
        pair(
            "cs_bill_hdemo_sk",
            ccol::CS_BILL_HDEMO_SK,
            "cr_refunded_hdemo_sk",
            ccol::CR_REFUNDED_HDEMO_SK,
        ),
        pair(
            "cs_bill_addr_sk",
            ccol::CS_BILL_ADDR_SK,
            "cr_refunded_addr_sk",
            ccol::CR_REFUNDED_ADDR_SK,
        ),
        pair(
            "cs_call_center_sk",
            ccol::CS_CALL_CENTER_SK,
            "cr_call_center_sk",
            ccol::CR_CALL_CENTER_SK,
        ),
    ],
    nullable: &[pair(
        "cs_catalog_page_sk",
        ccol::CS_CATALOG_PAGE_SK,
        "cr_catalog_page_sk",
        ccol::CR_CATALOG_PAGE_SK,
    )],
    strategy: MatchStrategy::TwoTier { order: CATALOG_ORDER },
};

static STORE: Schema = Schema {
    domain: Domain::Store,
    key: KeySpec {
        sale_parts: &[
            FieldRef::new("ss_ticket_number", scol::SS_TICKET_NUMBER),
            FieldRef::new("ss_sold_item_sk", scol::SS_SOLD_ITEM_SK),
        ],
        return_parts: &[
            FieldRef::new("sr_ticket_number", scol::SR_TICKET_NUMBER),
            FieldRef::new("sr_item_sk", scol::SR_ITEM_SK),
        ],
    },
    required: &[
        pair("ss_ticket_number", scol::SS_TICKET_NUMBER, "sr_ticket_number", scol::SR_TICKET_NUMBER),
        pair("ss_sold_item_sk", scol::SS_SOLD_ITEM_SK, "sr_item_sk", scol::SR_ITEM_SK),
    ],
    nullable: &[],
    strategy: MatchStrategy::Direct {
        customer: Some(pair(
            "ss_sold_customer_sk",
            scol::SS_SOLD_CUSTOMER_SK,
            "sr_customer_sk",
            scol::SR_CUSTOMER_SK,
        )),
    },
};

static WEB: Schema = Schema {
    domain: Domain::Web,
    key: KeySpec {
        sale_parts: &[
            FieldRef::new("ws_order_number", wcol::WS_ORDER_NUMBER),
            FieldRef::new("ws_item_sk", wcol::WS_ITEM_SK),
        ],
        return_parts: &[
            FieldRef::new("wr_order_number", wcol::WR_ORDER_NUMBER),
            FieldRef::new("wr_item_sk", wcol::WR_ITEM_SK),
        ],
    },
    required: &[
        pair("ws_item_sk", wcol::WS_ITEM_SK, "wr_item_sk", wcol::WR_ITEM_SK),
        pair("ws_order_number", wcol::WS_ORDER_NUMBER, "wr_order_number", wcol::WR_ORDER_NUMBER),
    ],
    nullable: &[pair(
        "ws_web_page_sk",
        wcol::WS_WEB_PAGE_SK,
        "wr_web_page_sk",
        wcol::WR_WEB_PAGE_SK,
    )],
    strategy: MatchStrategy::Direct { customer: None },
};
