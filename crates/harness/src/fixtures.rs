use shopfloor_core::{SheetMeta, Slot};

/// One line item as entered on the shipping list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub name: &'static str,
    pub material: &'static str,
    pub quantity: &'static str,
    pub surface_treatment: &'static str,
    pub notes: &'static str,
    pub unit_price: &'static str,
    pub outsourced: bool,
}

impl LineItem {
    /// Non-empty stored values of this item, by slot.
    pub fn slots(&self) -> Vec<(Slot, &'static str)> {
        let flag = if self.outsourced { "true" } else { "" };
        [
            (Slot::Name, self.name),
            (Slot::Material, self.material),
            (Slot::Quantity, self.quantity),
            (Slot::SurfaceTreatment, self.surface_treatment),
            (Slot::Notes, self.notes),
            (Slot::UnitPrice, self.unit_price),
            (Slot::Outsourced, flag),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .collect()
    }
}

pub fn demo_meta() -> SheetMeta {
    SheetMeta {
        customer_name: "Hangzhou Precision Parts".into(),
        order_id: "QUO-2026-0815".into(),
        contact_person: "Chen Jing".into(),
        notes: "Deliver by end of month".into(),
    }
}

/// Five items; the second and fourth are sent out.
pub fn demo_line_items() -> Vec<LineItem> {
    vec![
        LineItem {
            name: "M3 Pro 笔记本电脑 bracket",
            material: "6061-T6",
            quantity: "100",
            surface_treatment: "anodize black",
            notes: "",
            unit_price: "12.5",
            outsourced: false,
        },
        LineItem {
            name: "drive shaft",
            material: "42CrMo",
            quantity: "20",
            surface_treatment: "nitride",
            notes: "grind after heat treat",
            unit_price: "88",
            outsourced: true,
        },
        LineItem {
            name: "cover plate",
            material: "SUS304",
            quantity: "50",
            surface_treatment: "brushed",
            notes: "",
            unit_price: "",
            outsourced: false,
        },
        LineItem {
            name: "gear blank",
            material: "20CrMnTi",
            quantity: "8 pcs",
            surface_treatment: "carburize",
            notes: "",
            unit_price: "150.25",
            outsourced: true,
        },
        LineItem {
            name: "spacer",
            material: "POM",
            quantity: "",
            surface_treatment: "",
            notes: "sample only",
            unit_price: "3",
            outsourced: false,
        },
    ]
}
