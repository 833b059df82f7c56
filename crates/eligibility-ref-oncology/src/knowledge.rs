//! In-memory clinical knowledge bases.
//!
//! Small, hardcoded stand-ins for the disease ontology, the ICD
//! classification, the treatment database, the gene list and the ATC-based
//! medication categories. All data is fictional or heavily trimmed; no
//! external systems are contacted. Each table is immutable after
//! construction and is shared by reference.

use std::collections::{BTreeMap, BTreeSet};

use eligibility_contracts::domain::{Drug, DrugType, MedicationCategory, Treatment, TreatmentCategory};
use eligibility_core::traits::{DoidModel, GeneChecker, IcdModel, MedicationCategories, TreatmentDatabase};
use eligibility_resolver::InputResolver;

/// Root of every cancer DOID.
pub const CANCER_DOID: &str = "DOID:162";

// ── Disease ontology ──────────────────────────────────────────────────────────

struct DoidNode {
    term: &'static str,
    parent: Option<&'static str>,
}

pub struct DoidTree {
    nodes: BTreeMap<&'static str, DoidNode>,
}

impl DoidTree {
    pub fn reference() -> Self {
        let entries: [(&str, &str, Option<&str>); 10] = [
            ("DOID:4", "disease", None),
            (CANCER_DOID, "cancer", Some("DOID:4")),
            ("DOID:1324", "lung cancer", Some(CANCER_DOID)),
            ("DOID:3908", "lung non-small cell carcinoma", Some("DOID:1324")),
            ("DOID:3910", "lung adenocarcinoma", Some("DOID:3908")),
            ("DOID:9256", "colorectal cancer", Some(CANCER_DOID)),
            ("DOID:0050861", "colorectal adenocarcinoma", Some("DOID:9256")),
            ("DOID:1612", "breast cancer", Some(CANCER_DOID)),
            ("DOID:1909", "melanoma", Some(CANCER_DOID)),
            ("DOID:9352", "type 2 diabetes mellitus", Some("DOID:4")),
        ];
        let nodes = entries.into_iter().map(|(doid, term, parent)| (doid, DoidNode { term, parent })).collect();
        Self { nodes }
    }
}

impl DoidModel for DoidTree {
    /// Terms match case-insensitively; a DOID id resolves to itself.
    fn resolve_terms_to_doids(&self, terms: &[&str]) -> BTreeSet<String> {
        terms
            .iter()
            .flat_map(|term| {
                let term = term.trim();
                self.nodes
                    .iter()
                    .filter(move |(doid, node)| **doid == term || node.term.eq_ignore_ascii_case(term))
                    .map(|(doid, _)| doid.to_string())
            })
            .collect()
    }

    fn is_valid_cancer_doid_set(&self, doids: &BTreeSet<String>) -> bool {
        !doids.is_empty() && doids.iter().all(|doid| self.doid_with_parents(doid).contains(CANCER_DOID))
    }

    fn doid_with_parents(&self, doid: &str) -> BTreeSet<String> {
        let mut lineage = BTreeSet::new();
        let mut current = self.nodes.get_key_value(doid).map(|(key, _)| *key);
        while let Some(key) = current {
            if !lineage.insert(key.to_string()) {
                break;
            }
            current = self.nodes.get(key).and_then(|node| node.parent);
        }
        lineage
    }
}

// ── ICD ───────────────────────────────────────────────────────────────────────

/// ICD codes are hierarchical by prefix: `BD10` descends from `BD1`.
pub struct IcdTable {
    titles: BTreeMap<String, &'static str>,
}

impl IcdTable {
    pub fn reference() -> Self {
        let entries = [
            ("Heart failure", "BD1"),
            ("Congestive heart failure", "BD10"),
            ("Interstitial lung disease", "CB03"),
            ("Pneumonitis", "CB03.4"),
            ("Peripheral neuropathy", "8C0Z"),
            ("Diarrhoea", "ME05.1"),
            ("Type 2 diabetes mellitus", "5A11"),
            ("Chronic hepatitis B", "1E51.0"),
            ("Drug-induced", "XM9K"),
        ];
        Self { titles: entries.into_iter().map(|(title, code)| (title.to_lowercase(), code)).collect() }
    }
}

impl IcdModel for IcdTable {
    fn resolve_code_for_title(&self, title: &str) -> Option<String> {
        self.titles.get(&title.trim().to_lowercase()).map(|code| code.to_string())
    }

    fn is_valid_code(&self, code: &str) -> bool {
        self.titles.values().any(|known| *known == code)
    }

    fn is_same_or_descendant(&self, code: &str, ancestor: &str) -> bool {
        code.starts_with(ancestor)
    }
}

// ── Treatments ────────────────────────────────────────────────────────────────

pub struct TreatmentCatalog {
    drugs: BTreeMap<&'static str, Drug>,
    treatments: BTreeMap<&'static str, Treatment>,
}

impl TreatmentCatalog {
    pub fn reference() -> Self {
        let drugs: BTreeMap<&'static str, Drug> = [
            ("CAPECITABINE", DrugType::Antimetabolite),
            ("FLUOROURACIL", DrugType::Antimetabolite),
            ("OXALIPLATIN", DrugType::PlatinumCompound),
            ("CARBOPLATIN", DrugType::PlatinumCompound),
            ("IRINOTECAN", DrugType::Topo1Inhibitor),
            ("PACLITAXEL", DrugType::Taxane),
            ("PEMBROLIZUMAB", DrugType::AntiPd1),
            ("SOTORASIB", DrugType::KrasG12cInhibitor),
            ("OSIMERTINIB", DrugType::EgfrTki),
            ("CETUXIMAB", DrugType::EgfrAntibody),
            ("BEVACIZUMAB", DrugType::VegfAntibody),
        ]
        .into_iter()
        .map(|(name, drug_type)| {
            (name, Drug { name: name.to_string(), category: drug_type.category(), drug_types: BTreeSet::from([drug_type]) })
        })
        .collect();

        let combinations: [(&'static str, &[&str]); 4] = [
            ("CAPOX", &["CAPECITABINE", "OXALIPLATIN"]),
            ("FOLFOX", &["FLUOROURACIL", "OXALIPLATIN"]),
            ("FOLFIRI", &["FLUOROURACIL", "IRINOTECAN"]),
            ("CARBOPLATIN+PACLITAXEL", &["CARBOPLATIN", "PACLITAXEL"]),
        ];

        let mut treatments: BTreeMap<&'static str, Treatment> =
            drugs.iter().map(|(name, drug)| (*name, treatment_of(name, [drug.clone()]))).collect();
        for (name, components) in combinations {
            let members = components.iter().filter_map(|c| drugs.get(c).cloned());
            treatments.insert(name, treatment_of(name, members));
        }
        treatments.insert(
            "STEREOTACTIC RADIOTHERAPY",
            Treatment {
                name: "STEREOTACTIC RADIOTHERAPY".to_string(),
                categories: BTreeSet::from([TreatmentCategory::Radiotherapy]),
                types: BTreeSet::from([DrugType::StereotacticRadiotherapy]),
                drugs: BTreeSet::new(),
                is_systemic: false,
            },
        );

        Self { drugs, treatments }
    }
}

fn treatment_of(name: &str, drugs: impl IntoIterator<Item = Drug>) -> Treatment {
    let drugs: BTreeSet<Drug> = drugs.into_iter().collect();
    Treatment {
        name: name.to_string(),
        categories: drugs.iter().map(|d| d.category).collect(),
        types: drugs.iter().flat_map(|d| d.drug_types.iter().copied()).collect(),
        drugs,
        is_systemic: true,
    }
}

impl TreatmentDatabase for TreatmentCatalog {
    fn find_treatment_by_name(&self, name: &str) -> Option<Treatment> {
        self.treatments.get(name.trim().to_uppercase().as_str()).cloned()
    }

    fn find_drug_by_name(&self, name: &str) -> Option<Drug> {
        self.drugs.get(name.trim().to_uppercase().as_str()).cloned()
    }
}

// ── Genes ─────────────────────────────────────────────────────────────────────

pub struct GeneList {
    symbols: BTreeSet<&'static str>,
}

impl GeneList {
    pub fn reference() -> Self {
        let symbols = [
            "ALK", "BRAF", "BRCA1", "BRCA2", "EGFR", "ERBB2", "KRAS", "MET", "MLH1", "NRAS", "PIK3CA", "ROS1",
            "TP53", "UGT1A1",
        ];
        Self { symbols: symbols.into_iter().collect() }
    }
}

impl GeneChecker for GeneList {
    /// Symbols are case-sensitive.
    fn is_valid_gene(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }
}

// ── Medication categories ─────────────────────────────────────────────────────

pub struct AtcCategories {
    categories: BTreeMap<&'static str, &'static [&'static str]>,
}

impl AtcCategories {
    pub fn reference() -> Self {
        let categories: [(&'static str, &'static [&'static str]); 5] = [
            ("Anticoagulants", &["B01AA", "B01AB", "B01AE", "B01AF"]),
            ("Corticosteroids", &["H02AB"]),
            ("Immunosuppressants", &["L04A"]),
            ("Antiepileptics", &["N03A"]),
            ("Proton pump inhibitors", &["A02BC"]),
        ];
        Self { categories: categories.into_iter().collect() }
    }
}

impl MedicationCategories for AtcCategories {
    fn resolve_category(&self, name: &str) -> Option<MedicationCategory> {
        let name = name.trim();
        self.categories
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(name))
            .map(|(known, levels)| MedicationCategory {
                name: known.to_string(),
                atc_levels: levels.iter().map(|level| level.to_string()).collect(),
            })
    }

    fn categories_for_atc_code(&self, atc_code: &str) -> BTreeSet<String> {
        self.categories
            .iter()
            .filter(|(_, levels)| levels.iter().any(|level| atc_code.starts_with(level)))
            .map(|(name, _)| name.to_string())
            .collect()
    }
}

// ── Bundle ────────────────────────────────────────────────────────────────────

/// Every reference knowledge base in one place.
pub struct ReferenceKnowledge {
    pub doids: DoidTree,
    pub icd: IcdTable,
    pub treatments: TreatmentCatalog,
    pub genes: GeneList,
    pub medications: AtcCategories,
}

impl ReferenceKnowledge {
    pub fn new() -> Self {
        Self {
            doids: DoidTree::reference(),
            icd: IcdTable::reference(),
            treatments: TreatmentCatalog::reference(),
            genes: GeneList::reference(),
            medications: AtcCategories::reference(),
        }
    }

    pub fn resolver(&self) -> InputResolver<'_> {
        InputResolver::new(&self.doids, &self.icd, &self.treatments, &self.genes, &self.medications)
    }
}

impl Default for ReferenceKnowledge {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doid_lineage_walks_to_the_root() {
        let tree = DoidTree::reference();
        let lineage = tree.doid_with_parents("DOID:3910");
        assert!(lineage.contains("DOID:1324") && lineage.contains(CANCER_DOID) && lineage.contains("DOID:4"));
        assert!(tree.doid_with_parents("DOID:0").is_empty());
    }

    #[test]
    fn doid_terms_and_cancer_sets() {
        let tree = DoidTree::reference();
        assert_eq!(tree.resolve_terms_to_doids(&["Lung Cancer"]), BTreeSet::from(["DOID:1324".to_string()]));
        assert!(tree.is_valid_cancer_doid_set(&BTreeSet::from(["DOID:9256".to_string()])));
        assert!(!tree.is_valid_cancer_doid_set(&BTreeSet::from(["DOID:9352".to_string()])));
        assert!(!tree.is_valid_cancer_doid_set(&BTreeSet::new()));
    }

    #[test]
    fn icd_titles_and_hierarchy() {
        let icd = IcdTable::reference();
        assert_eq!(icd.resolve_code_for_title("pneumonitis").as_deref(), Some("CB03.4"));
        assert!(icd.is_valid_code("BD10"));
        assert!(icd.is_same_or_descendant("BD10", "BD1"));
        assert!(!icd.is_same_or_descendant("CB03.4", "BD1"));
    }

    #[test]
    fn combination_treatments_carry_their_drugs() {
        let catalog = TreatmentCatalog::reference();
        let capox = catalog.find_treatment_by_name("capox").unwrap();
        assert_eq!(capox.drugs.len(), 2);
        assert_eq!(capox.categories, BTreeSet::from([TreatmentCategory::Chemotherapy]));
        assert!(catalog.find_drug_by_name("ASPIRINUM").is_none());
    }

    #[test]
    fn atc_codes_map_to_categories() {
        let categories = AtcCategories::reference();
        assert_eq!(categories.categories_for_atc_code("B01AA03"), BTreeSet::from(["Anticoagulants".to_string()]));
        assert_eq!(categories.resolve_category("anticoagulants").unwrap().name, "Anticoagulants");
    }
}
