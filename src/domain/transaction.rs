use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::common::{EntityId, Ref};
use crate::domain::values::Money;
use crate::tracking::{AttributeClass, AttributeValue, DataType, ExtensionSet, Record, Tracked};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionValues {
    pub date: NaiveDate,
    /// Source of the funds.
    pub debit: EntityId,
    /// Destination of the funds.
    pub credit: EntityId,
    pub amount: Money,
    pub category: EntityId,
    pub reconciled: bool,
    /// Owning transaction when this one is part of a split.
    pub parent: Option<EntityId>,
    /// Pattern this transaction was generated from.
    pub template: Option<EntityId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TransactionInfoClass {
    DebitUnits,
    CreditUnits,
    TaxCredit,
    NatInsurance,
    Benefit,
    Pension,
    Donation,
    Dilution,
    QualifyYears,
    ThirdParty,
    CreditDate,
    Reference,
    Comments,
}

impl AttributeClass for TransactionInfoClass {
    const ALL: &'static [Self] = &[
        TransactionInfoClass::DebitUnits,
        TransactionInfoClass::CreditUnits,
        TransactionInfoClass::TaxCredit,
        TransactionInfoClass::NatInsurance,
        TransactionInfoClass::Benefit,
        TransactionInfoClass::Pension,
        TransactionInfoClass::Donation,
        TransactionInfoClass::Dilution,
        TransactionInfoClass::QualifyYears,
        TransactionInfoClass::ThirdParty,
        TransactionInfoClass::CreditDate,
        TransactionInfoClass::Reference,
        TransactionInfoClass::Comments,
    ];

    fn field(self) -> &'static str {
        match self {
            TransactionInfoClass::DebitUnits => "DebitUnits",
            TransactionInfoClass::CreditUnits => "CreditUnits",
            TransactionInfoClass::TaxCredit => "TaxCredit",
            TransactionInfoClass::NatInsurance => "NatInsurance",
            TransactionInfoClass::Benefit => "Benefit",
            TransactionInfoClass::Pension => "Pension",
            TransactionInfoClass::Donation => "Donation",
            TransactionInfoClass::Dilution => "Dilution",
            TransactionInfoClass::QualifyYears => "QualifyYears",
            TransactionInfoClass::ThirdParty => "ThirdParty",
            TransactionInfoClass::CreditDate => "CreditDate",
            TransactionInfoClass::Reference => "Reference",
            TransactionInfoClass::Comments => "Comments",
        }
    }

    fn data_type(self) -> DataType {
        match self {
            TransactionInfoClass::DebitUnits | TransactionInfoClass::CreditUnits => {
                DataType::Units
            }
            TransactionInfoClass::TaxCredit
            | TransactionInfoClass::NatInsurance
            | TransactionInfoClass::Benefit
            | TransactionInfoClass::Pension
            | TransactionInfoClass::Donation => DataType::Money,
            TransactionInfoClass::Dilution => DataType::Dilution,
            TransactionInfoClass::QualifyYears => DataType::Integer,
            TransactionInfoClass::ThirdParty => DataType::Link,
            TransactionInfoClass::CreditDate => DataType::Date,
            TransactionInfoClass::Reference => DataType::ShortText,
            TransactionInfoClass::Comments => DataType::String,
        }
    }
}

pub type Transaction = Tracked<Record<TransactionValues>, ExtensionSet<TransactionInfoClass>>;

impl Tracked<Record<TransactionValues>, ExtensionSet<TransactionInfoClass>> {
    pub fn date(&self) -> NaiveDate {
        self.values().date
    }

    pub fn debit(&self) -> EntityId {
        self.values().debit
    }

    pub fn credit(&self) -> EntityId {
        self.values().credit
    }

    pub fn third_party(&self) -> Option<EntityId> {
        self.info().link_id(TransactionInfoClass::ThirdParty)
    }
}

/// Request to admit a new transaction into an edit session.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    pub date: NaiveDate,
    pub debit: Ref,
    pub credit: Ref,
    pub category: Ref,
    pub amount: Money,
    pub reconciled: bool,
    pub parent: Option<EntityId>,
    pub template: Option<EntityId>,
    pub info: Vec<(TransactionInfoClass, AttributeValue)>,
    pub links: Vec<(TransactionInfoClass, Ref)>,
}

impl TransactionDraft {
    pub fn new(
        date: NaiveDate,
        debit: impl Into<Ref>,
        credit: impl Into<Ref>,
        category: impl Into<Ref>,
        amount: Money,
    ) -> Self {
        Self {
            date,
            debit: debit.into(),
            credit: credit.into(),
            category: category.into(),
            amount,
            reconciled: false,
            parent: None,
            template: None,
            info: Vec::new(),
            links: Vec::new(),
        }
    }

    pub fn with_info(mut self, class: TransactionInfoClass, value: AttributeValue) -> Self {
        self.info.push((class, value));
        self
    }

    pub fn with_link(mut self, class: TransactionInfoClass, target: impl Into<Ref>) -> Self {
        self.links.push((class, target.into()));
        self
    }

    pub fn with_parent(mut self, parent: EntityId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn info_value(&self, class: TransactionInfoClass) -> Option<&AttributeValue> {
        self.info
            .iter()
            .find(|(candidate, _)| *candidate == class)
            .map(|(_, value)| value)
    }
}
