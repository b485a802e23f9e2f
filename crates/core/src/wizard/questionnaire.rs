use crate::domain::question::{ChoiceOption, Question, TextRule};

/// Fixed question set walked by the wizard.
pub trait QuestionnaireDefinition: Send + Sync {
    fn questions(&self) -> &[Question];

    fn question_count(&self) -> usize {
        self.questions().len()
    }

    fn question(&self, index: usize) -> Option<&Question> {
        self.questions().get(index)
    }
}

#[derive(Clone, Debug)]
pub struct EnergyQuestionnaire {
    questions: Vec<Question>,
}

impl EnergyQuestionnaire {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }
}

impl Default for EnergyQuestionnaire {
    fn default() -> Self {
        Self::new(vec![
            Question::choice(
                "tipo_fornitura",
                "Per quale fornitura cerchi un'offerta?",
                vec![
                    ChoiceOption::new("LUCE", "Solo luce"),
                    ChoiceOption::new("GAS", "Solo gas"),
                    ChoiceOption::new("LUCE_GAS", "Luce e gas"),
                ],
            ),
            Question::choice(
                "consumo_annuo",
                "Quanto consumi in un anno?",
                vec![
                    ChoiceOption::new("BASSO", "Fino a 2700 kWh"),
                    ChoiceOption::new("MEDIO", "2700-4500 kWh"),
                    ChoiceOption::new("ALTO", "Oltre 4500 kWh"),
                ],
            ),
            Question::choice(
                "utilizzo_principale",
                "Quando usi di più l'energia?",
                vec![
                    ChoiceOption::new("DIURNO", "Durante il giorno"),
                    ChoiceOption::new("SERALE", "La sera e la notte"),
                    ChoiceOption::new("WEEKEND", "Nel weekend"),
                ],
            ),
            Question::choice(
                "preferenza_prezzo",
                "Preferisci un prezzo fisso o variabile?",
                vec![
                    ChoiceOption::new("FISSO", "Prezzo fisso"),
                    ChoiceOption::new("VARIABILE", "Prezzo variabile"),
                    ChoiceOption::new("INDIFFERENTE", "Indifferente"),
                ],
            ),
            Question::choice(
                "energia_verde",
                "Ti interessa energia da fonti rinnovabili?",
                vec![ChoiceOption::new("SI", "Sì"), ChoiceOption::new("NO", "Non importa")],
            ),
            Question::freeform(
                "cap",
                "Qual è il CAP della fornitura?",
                TextRule::PostalCode,
                "Es. 00184",
            ),
        ])
    }
}

impl QuestionnaireDefinition for EnergyQuestionnaire {
    fn questions(&self) -> &[Question] {
        &self.questions
    }
}
