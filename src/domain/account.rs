use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::category::AccountClass;
use crate::domain::common::{EntityId, Identifiable, Ref};
use crate::tracking::{AttributeClass, AttributeValue, DataType, ExtensionSet, Record, Tracked};

/// Core values of an account; everything optional lives in [`AccountInfoClass`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountValues {
    pub name: String,
    pub category: EntityId,
    pub currency: String,
    pub closed: bool,
    pub tax_free: bool,
    pub gross_interest: bool,
    /// Spending bucket rather than a real holding of money.
    pub auto_expense: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AccountInfoClass {
    Maturity,
    Parent,
    Alias,
    Holding,
    AccountNumber,
    WebSite,
    Notes,
}

impl AttributeClass for AccountInfoClass {
    const ALL: &'static [Self] = &[
        AccountInfoClass::Maturity,
        AccountInfoClass::Parent,
        AccountInfoClass::Alias,
        AccountInfoClass::Holding,
        AccountInfoClass::AccountNumber,
        AccountInfoClass::WebSite,
        AccountInfoClass::Notes,
    ];

    fn field(self) -> &'static str {
        match self {
            AccountInfoClass::Maturity => "Maturity",
            AccountInfoClass::Parent => "Parent",
            AccountInfoClass::Alias => "Alias",
            AccountInfoClass::Holding => "Holding",
            AccountInfoClass::AccountNumber => "AccountNumber",
            AccountInfoClass::WebSite => "WebSite",
            AccountInfoClass::Notes => "Notes",
        }
    }

    fn data_type(self) -> DataType {
        match self {
            AccountInfoClass::Maturity => DataType::Date,
            AccountInfoClass::Parent | AccountInfoClass::Alias | AccountInfoClass::Holding => {
                DataType::Link
            }
            AccountInfoClass::AccountNumber | AccountInfoClass::WebSite => DataType::ShortText,
            AccountInfoClass::Notes => DataType::String,
        }
    }
}

impl AccountInfoClass {
    /// Attributes that point at another account.
    pub const LINKS: [AccountInfoClass; 3] = [
        AccountInfoClass::Parent,
        AccountInfoClass::Alias,
        AccountInfoClass::Holding,
    ];
}

pub type Account = Tracked<Record<AccountValues>, ExtensionSet<AccountInfoClass>>;

impl Tracked<Record<AccountValues>, ExtensionSet<AccountInfoClass>> {
    pub fn name(&self) -> &str {
        &self.values().name
    }

    pub fn is_closed(&self) -> bool {
        self.values().closed
    }

    pub fn parent(&self) -> Option<EntityId> {
        self.info().link_id(AccountInfoClass::Parent)
    }

    pub fn alias(&self) -> Option<EntityId> {
        self.info().link_id(AccountInfoClass::Alias)
    }

    pub fn holding(&self) -> Option<EntityId> {
        self.info().link_id(AccountInfoClass::Holding)
    }

    pub fn maturity(&self) -> Option<NaiveDate> {
        self.info().date(AccountInfoClass::Maturity)
    }
}

/// Account fields the rule tables read, with the category class already resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountView {
    pub id: EntityId,
    pub class: AccountClass,
    pub parent: Option<EntityId>,
    pub closed: bool,
    pub tax_free: bool,
    pub gross_interest: bool,
    pub auto_expense: bool,
    pub maturity: Option<NaiveDate>,
}

impl AccountView {
    pub fn of(account: &Account, class: AccountClass) -> Self {
        let values = account.values();
        Self {
            id: account.id(),
            class,
            parent: account.parent(),
            closed: values.closed,
            tax_free: values.tax_free,
            gross_interest: values.gross_interest,
            auto_expense: values.auto_expense,
            maturity: account.maturity(),
        }
    }
}

/// Request to admit a new account into an edit session.
#[derive(Debug, Clone)]
pub struct AccountDraft {
    pub name: String,
    pub category: Ref,
    pub currency: String,
    pub closed: bool,
    pub tax_free: bool,
    pub gross_interest: bool,
    pub auto_expense: bool,
    pub info: Vec<(AccountInfoClass, AttributeValue)>,
    pub links: Vec<(AccountInfoClass, Ref)>,
}

impl AccountDraft {
    pub fn new(name: impl Into<String>, category: impl Into<Ref>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            currency: "GBP".into(),
            closed: false,
            tax_free: false,
            gross_interest: false,
            auto_expense: false,
            info: Vec::new(),
            links: Vec::new(),
        }
    }

    pub fn with_info(mut self, class: AccountInfoClass, value: AttributeValue) -> Self {
        self.info.push((class, value));
        self
    }

    pub fn with_link(mut self, class: AccountInfoClass, target: impl Into<Ref>) -> Self {
        self.links.push((class, target.into()));
        self
    }

    pub fn tax_free(mut self) -> Self {
        self.tax_free = true;
        self
    }

    pub fn gross_interest(mut self) -> Self {
        self.gross_interest = true;
        self
    }

    pub fn auto_expense(mut self) -> Self {
        self.auto_expense = true;
        self
    }
}
