//! Fitted constant tables for every shipped model version.
//!
//! RULE: these values are data, not logic. They are copied digit for
//! digit from the fitted logistic-regression pipelines and must never
//! be edited by hand. A refit ships as a new version, never as an edit.
//!
//! Each table is only meaningful as a whole: the mean and scale arrays
//! are positional and line up with `feature_order`.

/// One complete fitted model, in the raw positional form.
pub struct RawTable {
    pub feature_order: &'static [&'static str],
    pub mean:          &'static [f64],
    pub scale:         &'static [f64],
    pub coefficients:  &'static [(&'static str, f64)],
    pub intercept:     f64,
}

// ── States model (51 features) ─────────────────────────────────────
//
// 15 base features + 36 state dummies, reference state ABIA.
// Age enters as a continuous value. Fitted on 85,341 respondents
// (accuracy 0.7556, AUC 0.8354).

pub const STATES_V2: RawTable = RawTable {
    feature_order: &[
        "gender_male",
        "Age_numeric",
        "education_numeric",
        "income_numeric",
        "wealth_numeric",
        "urban",
        "savings_frequency_numeric",
        "runs_out_of_money",
        "Saves_Money",
        "Informal_Savings_Mode",
        "Regular_Saver",
        "Diverse_Savings_Reasons",
        "Old_Age_Planning",
        "Savings_Frequency_Score",
        "Savings_Behavior_Score",
        "state_ADAMAWA",
        "state_AKWA-IBOM",
        "state_ANAMBRA",
        "state_BAUCHI",
        "state_BAYELSA",
        "state_BENUE",
        "state_BORNO",
        "state_CROSS RIVER",
        "state_DELTA",
        "state_EBONYI",
        "state_EDO",
        "state_EKITI",
        "state_ENUGU",
        "state_FCT ABUJA",
        "state_GOMBE",
        "state_IMO",
        "state_JIGAWA",
        "state_KADUNA",
        "state_KANO",
        "state_KATSINA",
        "state_KEBBI",
        "state_KOGI",
        "state_KWARA",
        "state_LAGOS",
        "state_NASARAWA",
        "state_NIGER",
        "state_OGUN",
        "state_ONDO",
        "state_OSUN",
        "state_OYO",
        "state_PLATEAU",
        "state_RIVERS",
        "state_SOKOTO",
        "state_TARABA",
        "state_YOBE",
        "state_ZAMFARA",
    ],
    mean: &[
        0.49635282399812514, 36.285841926412, 1.6523172017811107, 31900.295948558705,
        2.689770330442934, 0.36657780642137333, 0.9971730724162174, 0.6623798921959222,
        0.12476564330911648, 0.07367588469650808, 0.09998242324818374, 0.07155202718537615,
        0.28401101476447155, 0.3576722521677994, 0.6539869932036559, 0.027141434262948207,
        0.027156081556128427, 0.0267752519334427, 0.03111085071478791, 0.02832786501054605,
        0.026936372158425124, 0.0266287790016405, 0.025984298101710802, 0.026511600656198734,
        0.029441059292242795, 0.026453011483477853, 0.025955003515350364, 0.02730255448793063,
        0.026672720881181156, 0.026892430278884463, 0.027756620576517458, 0.027097492383407546,
        0.025911061635809703, 0.03121338176704945, 0.02636512772439653, 0.027375790953831733,
        0.02636512772439653, 0.02674595734708226, 0.027009608624326224, 0.026672720881181156,
        0.02668736817436138, 0.02636512772439653, 0.027375790953831733, 0.026540895242559176,
        0.025691352238106396, 0.026540895242559176, 0.02630653855167565, 0.027097492383407546,
        0.0268484883993438, 0.02668736817436138, 0.025134755097258026,
    ],
    scale: &[
        0.4999866979302662, 12.054610714715444, 0.7337216065953476, 40627.556680022935,
        1.3530216403137145, 0.48186981463945994, 1.2964842582781235, 0.47289826666043167,
        0.3304529884246454, 0.2612427007797441, 0.2999765629005119, 0.25774470817271755,
        0.45094207860536445, 1.1013831749085157, 1.3156986826400827, 0.16249546704169404,
        0.16253808412383028, 0.16142595149895625, 0.17361729661122502, 0.16590779690686733,
        0.16189751083129086, 0.16099592271396904, 0.1590883853518925, 0.16065097474601572,
        0.16903929519491448, 0.16047819062705324, 0.15900107329156152, 0.16296356956806085,
        0.1611250658400975, 0.16176905597975097, 0.16427474118283888, 0.16236754075226587,
        0.15887000510075833, 0.17389395206767216, 0.16021862489883248, 0.16317584693662185,
        0.16021862489883248, 0.16134004807446387, 0.16211134959122062, 0.1611250658400975,
        0.16116808789052336, 0.16021862489883248, 0.16317584693662182, 0.16073728914686433,
        0.15821285238021576, 0.16073728914686436, 0.16004532039739514, 0.16236754075226587,
        0.16164048710027476, 0.16116808789052336, 0.1565343386719313,
    ],
    coefficients: &[
        ("education_numeric", 0.7812090836891461),
        ("wealth_numeric", 0.7493467001498288),
        ("income_numeric", 0.36525320694975566),
        ("runs_out_of_money", 0.22692983515345694),
        ("savings_frequency_numeric", 0.20533843056757767),
        ("gender_male", 0.19937261690069863),
        ("urban", 0.13191422417950918),
        ("Age_numeric", 0.08929998537425747),
        ("Old_Age_Planning", -0.05110416955861476),
        ("Diverse_Savings_Reasons", 0.03467645629924125),
        ("Savings_Behavior_Score", -0.01432971686110098),
        ("Informal_Savings_Mode", -0.005952845531674127),
        ("Regular_Saver", -0.004180451509442865),
        ("Savings_Frequency_Score", -0.0038491621825119176),
        ("Saves_Money", -0.005861854510566979),
        ("state_KOGI", 0.06872618194660643),
        ("state_EDO", 0.06004958860111426),
        ("state_NASARAWA", 0.05671691604699731),
        ("state_KWARA", 0.053344096004085476),
        ("state_CROSS RIVER", 0.0424403294210899),
        ("state_FCT ABUJA", 0.04077120083267543),
        ("state_DELTA", 0.0370883676595893),
        ("state_EKITI", 0.030508869408599145),
        ("state_PLATEAU", 0.027182050605272953),
        ("state_JIGAWA", 0.014073351973808133),
        ("state_YOBE", 0.013992770187459105),
        ("state_EBONYI", 0.013990668354829669),
        ("state_BAUCHI", 0.013873766705463378),
        ("state_LAGOS", 0.011626730917896972),
        ("state_ENUGU", 0.005311306232464988),
        ("state_NIGER", 0.004366711468898973),
        ("state_TARABA", 0.004199991521106988),
        ("state_KADUNA", 0.002566201199023511),
        ("state_OYO", -0.0013315100533585716),
        ("state_OSUN", -0.0012353743261026735),
        ("state_KEBBI", -0.001099583038559934),
        ("state_GOMBE", -0.008610179866198888),
        ("state_BENUE", -0.009703071354019802),
        ("state_RIVERS", -0.015619684881737563),
        ("state_OGUN", -0.016284998862037194),
        ("state_AKWA-IBOM", -0.016735812308376855),
        ("state_ANAMBRA", -0.019706264295104754),
        ("state_SOKOTO", -0.023244316646585158),
        ("state_IMO", -0.02489167789166703),
        ("state_BORNO", -0.034836012824704644),
        ("state_ONDO", -0.036290728452415676),
        ("state_KATSINA", -0.04585870581683522),
        ("state_ZAMFARA", -0.04924428676277526),
        ("state_ADAMAWA", -0.054803210159139214),
        ("state_BAYELSA", -0.05887521382493815),
        ("state_KANO", -0.09115848365646938),
    ],
    intercept: 0.11391884181808593,
};

// ── Non-circular model (66 features) ───────────────────────────────
//
// 22 base features, 1 income-source count, 3 agricultural interaction
// terms, 5 age-group dummies (reference 18-24) and 36 state dummies
// (reference ABIA). Transactional-account style predictors that leak
// the target were removed before fitting.

pub const NON_CIRCULAR_V3: RawTable = RawTable {
    feature_order: &[
        "gender_male",
        "education_numeric",
        "income_numeric",
        "wealth_numeric",
        "urban",
        "savings_frequency_numeric",
        "money_shortage_frequency",
        "Saves_Money",
        "Informal_Savings_Mode",
        "Regular_Saver",
        "Diverse_Savings_Reasons",
        "Old_Age_Planning",
        "Savings_Frequency_Score",
        "Savings_Behavior_Score",
        "Has_NIN",
        "Formal_Employment",
        "Business_Income",
        "Agricultural_Income",
        "Passive_Income",
        "Income_Diversity_Score",
        "Digital_Access_Index",
        "Infrastructure_Access_Index",
        "Ag_x_Formal",
        "Ag_x_Business",
        "Ag_x_Urban",
        "age_25-34",
        "age_35-44",
        "age_45-54",
        "age_55-64",
        "age_65+",
        "state_ADAMAWA",
        "state_AKWA IBOM",
        "state_ANAMBRA",
        "state_BAUCHI",
        "state_BAYELSA",
        "state_BENUE",
        "state_BORNO",
        "state_CROSS RIVER",
        "state_DELTA",
        "state_EBONYI",
        "state_EDO",
        "state_EKITI",
        "state_ENUGU",
        "state_FCT",
        "state_GOMBE",
        "state_IMO",
        "state_JIGAWA",
        "state_KADUNA",
        "state_KANO",
        "state_KATSINA",
        "state_KEBBI",
        "state_KOGI",
        "state_KWARA",
        "state_LAGOS",
        "state_NASARAWA",
        "state_NIGER",
        "state_OGUN",
        "state_ONDO",
        "state_OSUN",
        "state_OYO",
        "state_PLATEAU",
        "state_RIVERS",
        "state_SOKOTO",
        "state_TARABA",
        "state_YOBE",
        "state_ZAMFARA",
    ],
    mean: &[
        0.46686919385374015, 1.5772465108087879, 28429.474618060143, 2.0864262757011405,
        0.5483643728261348, 1.0, 2.8068507022410074, 0.125,
        0.074, 0.1, 0.072, 0.28000000000000014,
        0.36, 0.6500000000000002, 0.6784660766961652, 0.06163870910932066,
        0.4769515255580505, 0.35635979395060097, 0.014000792497688548, 0.980803944877383,
        1.4928895346277462, 3.230748910315678, 0.007748866288028882, 0.19424998899308765,
        0.13917139963897326, 0.28921762867080525, 0.22546559239202218, 0.12045964865935807,
        0.0663496675912473, 0.0468454189230837, 0.02756130850173909, 0.02751728085237529,
        0.026680755514463084, 0.026988949060009686, 0.027032976709373487, 0.028001584995377096,
        0.027825474397921896, 0.026768810813190685, 0.026900893761282085, 0.027077004358737288,
        0.027077004358737288, 0.027473253203011493, 0.0281776955928323, 0.02650464491700788,
        0.026636727865099283, 0.027165059657464886, 0.027913529696649494, 0.027165059657464886,
        0.026636727865099283, 0.027781446748558095, 0.02624047902082508, 0.024787566591819663,
        0.027825474397921896, 0.026680755514463084, 0.027649363800466693, 0.02734117025492009,
        0.02654867256637168, 0.02729714260555629, 0.02729714260555629, 0.027737419099194294,
        0.026988949060009686, 0.026152423722097477, 0.02729714260555629, 0.02738519790428389,
        0.026724783163826885, 0.02342270946154185,
    ],
    scale: &[
        0.4989011421956248, 0.8165699392942897, 40576.73760278704, 1.0868859458749143,
        0.49765539024623723, 1.0, 1.027634159332233, 1.0,
        1.0, 1.0, 1.0, 1.0,
        1.0, 1.0, 0.4670651554854831, 0.24049818845192414,
        0.4994684853180417, 0.4789232623355084, 0.11749370326585684, 0.8654883933007658,
        0.6835714436267134, 2.0357571080763783, 0.08768592452200714, 0.3956222071235043,
        0.3461252969106743, 0.45339915299528455, 0.41788857251585226, 0.3254982668221477,
        0.24889232451359022, 0.2113076563899294, 0.16371219495019623, 0.1635850852213208,
        0.16114866676345957, 0.16205105889393592, 0.16217951436480488, 0.16497725974546848,
        0.16447254291355892, 0.16140706793953694, 0.16179380604994215, 0.1623078562291247,
        0.1623078562291247, 0.16345786478923158, 0.16548024976990447, 0.1606304725599449,
        0.1610192926134627, 0.1625642002141654, 0.16472511817122418, 0.1625642002141654,
        0.1610192926134627, 0.164346092028728, 0.15984966775562193, 0.15547714666238177,
        0.16447254291355895, 0.1611486667634596, 0.16396608332791313, 0.1630755366816604,
        0.1607601957927872, 0.16294787083950565, 0.16294787083950565, 0.16421953197141304,
        0.16205105889393592, 0.15958845339045477, 0.16294787083950565, 0.16320309077963907,
        0.16127792511274855, 0.15124181347438956,
    ],
    coefficients: &[
        ("Has_NIN", 0.6644598937617628),
        ("Digital_Access_Index", 0.5298117452856),
        ("education_numeric", 0.5076306996382166),
        ("wealth_numeric", 0.45475340551364046),
        ("state_BORNO", -0.41599539627154225),
        ("Infrastructure_Access_Index", 0.4027026734387187),
        ("state_KATSINA", -0.340417189681083),
        ("Agricultural_Income", -0.2932442827935246),
        ("urban", 0.26654661974155947),
        ("Income_Diversity_Score", 0.2491866047247393),
        ("state_GOMBE", -0.24003075285390593),
        ("state_DELTA", 0.2158640802266165),
        ("state_SOKOTO", -0.1514947891968171),
        ("state_KOGI", 0.13880294724226586),
        ("gender_male", 0.13490315325263405),
        ("state_KANO", -0.12995787682763948),
        ("state_ADAMAWA", -0.12942485451364247),
        ("state_ZAMFARA", -0.12738086197287474),
        ("state_ONDO", -0.1260035697835486),
        ("state_LAGOS", 0.11393554515860539),
        ("state_EBONYI", -0.1041855015526909),
        ("state_OGUN", 0.10302012909939945),
        ("age_65+", -0.09795400637511534),
        ("state_ENUGU", -0.09734413334691633),
        ("income_numeric", 0.09358133153749748),
        ("state_ANAMBRA", -0.08655862305779555),
        ("state_PLATEAU", -0.08195455079394377),
        ("state_EKITI", -0.08113518957341719),
        ("state_TARABA", -0.07498554469351444),
        ("state_YOBE", -0.07436983086726516),
        ("Passive_Income", 0.07271177879569109),
        ("state_KADUNA", -0.07207660434713584),
        ("state_BAUCHI", -0.07059198182761625),
        ("state_KWARA", 0.06725996556030968),
        ("state_JIGAWA", -0.0643106362970892),
        ("Ag_x_Business", -0.06408819178427834),
        ("state_OYO", 0.061749968799899524),
        ("age_35-44", 0.05589489430370671),
        ("Ag_x_Urban", -0.054423378505815065),
        ("state_BENUE", -0.05408223825016447),
        ("age_25-34", 0.046632562504980817),
        ("state_NASARAWA", -0.044375050713570265),
        ("age_55-64", -0.04321429105482886),
        ("state_AKWA IBOM", -0.042682732989007516),
        ("state_EDO", 0.032221095227721),
        ("money_shortage_frequency", -0.023231734768994046),
        ("state_OSUN", 0.020603041828979787),
        ("Business_Income", 0.020335541146865786),
        ("Formal_Employment", 0.01845687491637213),
        ("state_FCT", 0.01737968157896144),
        ("state_IMO", -0.014118166823598547),
        ("state_NIGER", -0.011065179908049637),
        ("state_BAYELSA", -0.010436495128099764),
        ("Ag_x_Formal", 0.010366385196613),
        ("state_CROSS RIVER", 0.00848995663101973),
        ("age_45-54", -0.008480006956606364),
        ("state_KEBBI", 0.006609020592326266),
        ("state_RIVERS", -0.005748752638804391),
        ("Savings_Behavior_Score", -6.093267088580246e-17),
        ("Old_Age_Planning", -3.046633544290123e-17),
        ("Regular_Saver", 0.0),
        ("Informal_Savings_Mode", 0.0),
        ("Savings_Frequency_Score", 0.0),
        ("Diverse_Savings_Reasons", 0.0),
        ("Saves_Money", 0.0),
        ("savings_frequency_numeric", 0.0),
    ],
    intercept: 0.2811687603339701,
};
