//! Static copy for the informational sections of the landing page.

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FaqEntry {
    pub question: &'static str,
    pub answer: &'static str,
}

pub const FAQ_ENTRIES: [FaqEntry; 8] = [
    FaqEntry {
        question: "Che tipo di bollette posso caricare per l'analisi?",
        answer: "Puoi caricare bollette di luce e gas di qualsiasi fornitore del mercato libero o del servizio di maggior tutela. È importante che le bollette siano complete e leggibili, preferibilmente in formato PDF. Per un'analisi ottimale, consigliamo di caricare almeno due bollette consecutive per tipo di fornitura.",
    },
    FaqEntry {
        question: "Quanto tempo ci vuole per ricevere l'analisi?",
        answer: "L'analisi viene elaborata entro 24 ore dal caricamento delle bollette e del pagamento. Riceverai una email dettagliata con tutte le nostre valutazioni e i consigli personalizzati per la tua situazione specifica.",
    },
    FaqEntry {
        question: "Come funziona il pagamento dei €5.90?",
        answer: "Il pagamento è sicuro e viene processato attraverso i principali circuiti (carte di credito, debito, PayPal). La tariffa è una tantum e include l'analisi completa di tutte le bollette caricate in quella sessione, sia luce che gas. Non ci sono costi ricorrenti o nascosti.",
    },
    FaqEntry {
        question: "Siete indipendenti dai fornitori di energia?",
        answer: "Sì, siamo completamente indipendenti. Non accettiamo commissioni dai fornitori e questo ci permette di essere imparziali nelle nostre analisi. Il nostro unico obiettivo è trovare la soluzione migliore per te, basandoci esclusivamente sui dati delle tue bollette e sulle offerte disponibili sul mercato.",
    },
    FaqEntry {
        question: "Cosa include l'analisi delle bollette?",
        answer: "L'analisi include: valutazione dettagliata dei tuoi consumi, confronto con le medie di mercato, identificazione di eventuali anomalie nei costi, suggerimenti personalizzati per il risparmio, selezione delle migliori offerte compatibili con il tuo profilo di consumo, e una stima del potenziale risparmio annuale.",
    },
    FaqEntry {
        question: "Posso richiedere un'analisi aggiornata in futuro?",
        answer: "Sì, puoi richiedere una nuova analisi in qualsiasi momento. Ogni analisi è considerata separata e richiede un nuovo pagamento, in quanto le offerte di mercato e le condizioni cambiano costantemente. Consigliamo di aggiornare l'analisi ogni 6-12 mesi per massimizzare il risparmio.",
    },
    FaqEntry {
        question: "Come gestite i dati personali presenti nelle bollette?",
        answer: "Trattiamo i tuoi dati nel pieno rispetto del GDPR. Le bollette vengono utilizzate esclusivamente per l'analisi richiesta e vengono conservate in modo sicuro e criptato. Non condividiamo mai i tuoi dati con terze parti e li eliminiamo dopo 30 giorni dal completamento dell'analisi.",
    },
    FaqEntry {
        question: "Cosa succede se non sono soddisfatto dell'analisi?",
        answer: "Se non sei soddisfatto della qualità o completezza della nostra analisi, offriamo una garanzia di rimborso entro 14 giorni dalla ricezione. Basta inviarci una email spiegando i motivi dell'insoddisfazione e provvederemo al rimborso completo.",
    },
];

/// Value proposition shown above the FAQ, followed by why the analysis is paid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ServiceDescription {
    pub headline: &'static str,
    pub pitch: &'static str,
    pub offer: &'static str,
    pub price_line: &'static str,
    pub why_paid_title: &'static str,
    pub why_paid: [&'static str; 2],
    pub commitments: [&'static str; 2],
}

pub const SERVICE_DESCRIPTION: ServiceDescription = ServiceDescription {
    headline: "Al tuo fianco, bolletta dopo bolletta.",
    pitch: "Studiamo giorno dopo giorno le offerte di luce e gas che offre il mercato e affiniamo i nostri modelli di valutazione per darti il nostro consiglio migliore. Qualsiasi siano i tuoi consumi o la tua posizione, sappiamo cosa consigliarti quando si parla di bollette luce&gas.",
    offer: "Inserisci le tue ultime bollette e verifica il risparmio potenziale: potrai sbloccare l'indicazione delle offerte che troviamo in linea con il tuo profilo energetico.",
    price_line: "Paghi €6.90: ricevi la tua analisi.",
    why_paid_title: "Perché non eroghiamo le analisi gratis.",
    why_paid: [
        "Diversi operatori promettono di trovarti il giusto fornitore di luce e gas gratuitamente. Non lo fanno perché amano il volontariato ma piuttosto perché hanno un modello di business molto chiaro: ricevono una commissione dal fornitore a cui ti indirizzano.",
        "Questo è un problema: non stanno seguendo il tuo interesse ma tentano di \"piazzarti\" al miglior offerente. [PS: la commissione che ricevono la paghi tu, quando paghi le bollette]",
    ],
    commitments: [
        "Vogliamo cambiare il paradigma: non vogliamo diventare partner dei fornitori, vogliamo diventare il Tuo partner, la tua guida nella scelta del fornitore.",
        "Così saremo sempre allineati al tuo interesse.",
    ],
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommunityInvite {
    pub headline: &'static str,
    pub pitch: &'static str,
    pub highlights: [&'static str; 3],
    pub call_to_action: &'static str,
    pub footnote: &'static str,
    pub url: String,
}

impl CommunityInvite {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            headline: "Unisciti alla nostra community WhatsApp",
            pitch: "Entra nel gruppo dove condividiamo aggiornamenti in tempo reale sulle migliori offerte, consigli per il risparmio e novità del mercato energetico.",
            highlights: ["Q&A con l'esperto", "Le migliori offerte. Aggiornate", "Conosciamoci"],
            call_to_action: "Entra nel Gruppo WhatsApp",
            footnote: "Partecipazione gratuita • Puoi uscire quando vuoi • Max 2 messaggi al giorno",
            url: url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CommunityInvite, FAQ_ENTRIES, SERVICE_DESCRIPTION};

    #[test]
    fn faq_entries_are_complete() {
        assert!(FAQ_ENTRIES.iter().all(|entry| entry.question.ends_with('?')));
        assert!(FAQ_ENTRIES.iter().all(|entry| !entry.answer.is_empty()));
    }

    #[test]
    fn community_invite_carries_configured_link() {
        let invite = CommunityInvite::new("https://chat.whatsapp.com/energia");
        assert_eq!(invite.url, "https://chat.whatsapp.com/energia");
        assert_eq!(invite.highlights.len(), 3);
    }

    #[test]
    fn service_description_explains_the_paid_analysis() {
        assert!(SERVICE_DESCRIPTION.headline.starts_with("Al tuo fianco"));
        assert!(SERVICE_DESCRIPTION.why_paid_title.ends_with("gratis."));
        assert!(SERVICE_DESCRIPTION.why_paid.iter().all(|paragraph| !paragraph.is_empty()));
    }
}
