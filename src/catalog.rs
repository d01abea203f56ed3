use crate::users::Account;
use serde::Serialize;

/// One embeddable BI report link
///
/// The catalog is compiled into the binary; adding a dashboard means adding
/// an entry here and assigning its identifier to users in the user table.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct DashboardEntry {
    /// Embed URL; contains the report identifier somewhere in its text
    pub url: &'static str,

    /// Human-readable title shown in the portal
    pub title: &'static str,
}

/// Static catalog of every dashboard the portal can embed
pub const DASHBOARD_CATALOG: &[DashboardEntry] = &[
    DashboardEntry {
        url: "https://app.powerbi.com/view?r=eyJrIjoiMmU1MTBmYTItMmY3MS00NjYzLTg3ZWUtOWQyYzI1YTgyYTQxIiwidCI6ImNjMmE5NWVhLTMzNWMtNDQzYi04NDQzLWU5YWQzM2ZmOWUwNCJ9",
        title: "Central de BIs",
    },
    DashboardEntry {
        url: "https://app.powerbi.com/reportEmbed?reportId=196b835a-4b66-4f9d-b7e0-1d63d4f02e88&autoAuth=true&ctid=cc2a95ea-335c-443b-8443-e9ad33ff9e04",
        title: "Faturamento",
    },
    DashboardEntry {
        url: "https://app.powerbi.com/view?r=eyJrIjoiMTljYjYxOGQtNDMzMy00MTE2LTkxMzYtNmZhMGM1MmMzZjgxIiwidCI6ImNjMmE5NWVhLTMzNWMtNDQzYi04NDQzLWU5YWQzM2ZmOWUwNCJ9",
        title: "Controladoria Anderson",
    },
    DashboardEntry {
        url: "https://app.powerbi.com/view?r=eyJrIjoiYTIyNGRkZjUtYTBkMS00ZjgxLTgyOWMtOTcxYTc4NjRiMDQ2IiwidCI6ImNjMmE5NWVhLTMzNWMtNDQzYi04NDQzLWU5YWQzM2ZmOWUwNCJ9",
        title: "Controladoria Luiz",
    },
    DashboardEntry {
        url: "https://app.powerbi.com/view?r=eyJrIjoiMWMxMTEwZWEtODM4ZS00YmM0LThjNzEtMTdkYmUwYWYzODE4IiwidCI6ImNjMmE5NWVhLTMzNWMtNDQzYi04NDQzLWU5YWQzM2ZmOWUwNCJ9",
        title: "Controladoria Cesar",
    },
    DashboardEntry {
        url: "https://app.powerbi.com/view?r=eyJrIjoiY2RmZWFhYTctNzZjOC00YmVjLThiNTItNWZiMjFkMGJmOWJjIiwidCI6ImNjMmE5NWVhLTMzNWMtNDQzYi04NDQzLWU5YWQzM2ZmOWUwNCJ9",
        title: "Controladoria Frederico",
    },
    DashboardEntry {
        url: "https://app.powerbi.com/view?r=eyJrIjoiMGM5YzM3MGQtZTkwZi00NzFhLTlkNzYtNmFkNTk4ZGUwODdlIiwidCI6ImNjMmE5NWVhLTMzNWMtNDQzYi04NDQzLWU5YWQzM2ZmOWUwNCJ9",
        title: "Controladoria Janaina",
    },
    DashboardEntry {
        url: "https://app.powerbi.com/view?r=eyJrIjoiMWEzODYyNDctNTU1NS00OWZlLWE2NGYtZGVmOTM3NjkyMTI1IiwidCI6ImNjMmE5NWVhLTMzNWMtNDQzYi04NDQzLWU5YWQzM2ZmOWUwNCJ9",
        title: "Controladoria Rafael",
    },
    DashboardEntry {
        url: "https://app.powerbi.com/reportEmbed?reportId=385a53c2-365e-416c-9ca5-f9c3f08bcd11&autoAuth=true&ctid=cc2a95ea-335c-443b-8443-e9ad33ff9e04",
        title: "Controladoria Exportável",
    },
    DashboardEntry {
        url: "https://app.powerbi.com/reportEmbed?reportId=0ba6b5ca-c1a0-44b6-9033-db6491ca6f36&autoAuth=true&ctid=cc2a95ea-335c-443b-8443-e9ad33ff9e04",
        title: "Abastecimento",
    },
    DashboardEntry {
        url: "https://app.powerbi.com/reportEmbed?reportId=c84a7784-b70a-4a52-8ba8-098381066e82&autoAuth=true&ctid=cc2a95ea-335c-443b-8443-e9ad33ff9e04",
        title: "Suprimentos",
    },
    DashboardEntry {
        url: "https://app.powerbi.com/reportEmbed?reportId=2cccbc6d-b005-4c1d-8a44-044289eca7b5&autoAuth=true&ctid=cc2a95ea-335c-443b-8443-e9ad33ff9e04",
        title: "Recursos Humanos",
    },
    DashboardEntry {
        url: "https://app.powerbi.com/reportEmbed?reportId=2b57c4a9-f624-4e18-99a4-9350ae5ee0df&autoAuth=true&ctid=cc2a95ea-335c-443b-8443-e9ad33ff9e04",
        title: "Manutenção",
    },
    DashboardEntry {
        url: "https://app.powerbi.com/reportEmbed?reportId=192565df-af8d-4e7e-bf7b-d5ca570095b4&autoAuth=true&ctid=cc2a95ea-335c-443b-8443-e9ad33ff9e04",
        title: "Contas a Pagar",
    },
    DashboardEntry {
        url: "https://app.powerbi.com/reportEmbed?reportId=93939e7b-780a-486c-b40d-22dee554aef1&autoAuth=true&ctid=cc2a95ea-335c-443b-8443-e9ad33ff9e04",
        title: "Pátio",
    },
];

/// Select the dashboards an account may see
///
/// Walks the catalog in order and includes an entry whenever one of the
/// account's assigned identifiers (whitespace-trimmed) occurs as a substring
/// of the entry's URL.
///
/// Substring containment is the historical matching policy and is kept as-is:
/// an identifier that happens to occur inside another dashboard's URL will
/// over-match, and an entry matched by several identifiers appears once per
/// match. Blank identifiers from stray commas are skipped, since an empty
/// string is a substring of every URL.
pub fn visible_dashboards(account: &Account) -> Vec<&'static DashboardEntry> {
    filter_catalog(DASHBOARD_CATALOG, &account.dashboard_ids)
}

fn filter_catalog<'a>(
    catalog: &'a [DashboardEntry],
    dashboard_ids: &[String],
) -> Vec<&'a DashboardEntry> {
    let mut visible = Vec::new();

    for entry in catalog {
        for id in dashboard_ids {
            let id = id.trim();
            if id.is_empty() {
                continue;
            }
            if entry.url.contains(id) {
                visible.push(entry);
            }
        }
    }

    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::{Account, Role};

    const TEST_CATALOG: &[DashboardEntry] = &[
        DashboardEntry {
            url: "https://example.com/embed?reportId=alpha-111",
            title: "Alpha",
        },
        DashboardEntry {
            url: "https://example.com/embed?reportId=beta-222",
            title: "Beta",
        },
        DashboardEntry {
            url: "https://example.com/embed?reportId=gamma-333",
            title: "Gamma",
        },
    ];

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn account_with(ids_list: &[&str]) -> Account {
        Account {
            email: "t@example.com".to_string(),
            password_hash: String::new(),
            role: Role::Standard,
            name: "T".to_string(),
            dashboard_ids: ids(ids_list),
        }
    }

    #[test]
    fn preserves_catalog_order() {
        let visible = filter_catalog(TEST_CATALOG, &ids(&["gamma-333", "alpha-111"]));
        let titles: Vec<&str> = visible.iter().map(|d| d.title).collect();
        assert_eq!(titles, vec!["Alpha", "Gamma"]);
    }

    #[test]
    fn matches_by_substring_containment() {
        // "beta" is only a fragment of the report id, yet it matches.
        let visible = filter_catalog(TEST_CATALOG, &ids(&["beta"]));
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "Beta");

        // A fragment shared by every URL over-matches all of them.
        let visible = filter_catalog(TEST_CATALOG, &ids(&["reportId"]));
        assert_eq!(visible.len(), 3);
    }

    #[test]
    fn identifiers_are_trimmed_before_matching() {
        let visible = filter_catalog(TEST_CATALOG, &ids(&["  alpha-111  "]));
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "Alpha");
    }

    #[test]
    fn entry_repeats_when_matched_by_several_identifiers() {
        // Both identifiers occur in the Alpha URL; no de-duplication happens.
        let visible = filter_catalog(TEST_CATALOG, &ids(&["alpha", "111"]));
        assert_eq!(visible.len(), 2);
        assert_eq!(visible[0].title, "Alpha");
        assert_eq!(visible[1].title, "Alpha");
    }

    #[test]
    fn blank_identifiers_match_nothing() {
        let visible = filter_catalog(TEST_CATALOG, &ids(&["", "   "]));
        assert!(visible.is_empty());
    }

    #[test]
    fn no_assignments_yields_empty_list() {
        let visible = filter_catalog(TEST_CATALOG, &[]);
        assert!(visible.is_empty());
    }

    #[test]
    fn real_catalog_lookup_by_report_id() {
        let account = account_with(&["0ba6b5ca"]);
        let visible = visible_dashboards(&account);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "Abastecimento");
    }
}
