//! Starter prompts offered to bulletin authors.
//!
//! Wording is the French used by plant-health bulletin (BSV) editors; front
//! ends list these verbatim so an author can pick one and submit it as-is.

pub const EXAMPLE_PROMPTS: [&str; 5] = [
    "Rédige une analyse de la phénologie décrivant les différentes situations observées pour la culture sur le réseau Charentes",
    "Rédige une courte synthèse sur les conditions météorologiques des 7 derniers jours ainsi que sur les prévisions météorologiques pour la semaine à venir.",
    "Rédige un encart « biodiversité » sur les auxiliaires de culture de la vigne présent sur la période en cours (bénéfices, ravageurs ciblés et conseils pratiques).",
    "Rédige un encart “mémo de l’Observateur” qui fait un résumé des bonnes pratiques d’observations aux champs et suggère la recherche de premiers symptômes pour les bioagresseurs à forte pression épidémiologique sur la période en cours.",
    "A partir du bulletin de santé végétal, rédige une rubrique de synthèse intitulé “Ce qu’il faut retenir”, comprenant un récapitulatif de deux lignes maximum sur les éléments essentiels à retenir.",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_are_usable_as_submissions() {
        assert_eq!(EXAMPLE_PROMPTS.len(), 5);
        for prompt in EXAMPLE_PROMPTS {
            assert!(!prompt.trim().is_empty());
        }
    }
}
